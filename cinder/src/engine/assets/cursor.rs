/// Pixel inside a cursor texture that marks the pointer position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotspot {
    pub x: u32,
    pub y: u32,
}

impl Hotspot {
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Cursors shipped with the builtin resources. Their textures are imported from `Cursors/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCursor {
    Arrow,
    ArrowDrag,
    ArrowLeftRight,
    IBeam,
    Deny,
    Wait,
    SizeNESW,
    SizeNS,
    SizeNWSE,
    SizeWE,
}

impl BuiltinCursor {
    pub const ALL: [BuiltinCursor; 10] = [
        BuiltinCursor::Arrow,
        BuiltinCursor::ArrowDrag,
        BuiltinCursor::ArrowLeftRight,
        BuiltinCursor::IBeam,
        BuiltinCursor::Deny,
        BuiltinCursor::Wait,
        BuiltinCursor::SizeNESW,
        BuiltinCursor::SizeNS,
        BuiltinCursor::SizeNWSE,
        BuiltinCursor::SizeWE,
    ];

    /// Source texture under the raw `Cursors/` folder.
    pub fn texture_name(self) -> &'static str {
        match self {
            BuiltinCursor::Arrow => "Arrow.png",
            BuiltinCursor::ArrowDrag => "ArrowDrag.png",
            BuiltinCursor::ArrowLeftRight => "ArrowLeftRight.png",
            BuiltinCursor::IBeam => "IBeam.png",
            BuiltinCursor::Deny => "Deny.png",
            BuiltinCursor::Wait => "Wait.png",
            BuiltinCursor::SizeNESW => "SizeNESW.png",
            BuiltinCursor::SizeNS => "SizeNS.png",
            BuiltinCursor::SizeNWSE => "SizeNWSE.png",
            BuiltinCursor::SizeWE => "SizeWE.png",
        }
    }

    pub const fn hotspot(self) -> Hotspot {
        match self {
            BuiltinCursor::Arrow => Hotspot::new(11, 6),
            BuiltinCursor::ArrowDrag => Hotspot::new(11, 4),
            BuiltinCursor::ArrowLeftRight => Hotspot::new(9, 4),
            _ => Hotspot::new(15, 15),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn texture_names_are_distinct() {
        let names: HashSet<_> = BuiltinCursor::ALL.iter().map(|c| c.texture_name()).collect();
        assert_eq!(names.len(), BuiltinCursor::ALL.len());
    }

    #[test]
    fn pointers_sit_off_center() {
        assert_eq!(BuiltinCursor::Arrow.hotspot(), Hotspot::new(11, 6));
        assert_eq!(BuiltinCursor::IBeam.hotspot(), Hotspot::new(15, 15));
    }
}
