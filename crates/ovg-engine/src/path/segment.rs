use crate::error::{VgError, VgResult};

/// Path segment command, numbered as in the OpenVG byte encoding
/// (`command << 1 | relative`).
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum SegmentCommand {
    Close = 0,
    MoveTo = 1,
    LineTo = 2,
    HLineTo = 3,
    VLineTo = 4,
    QuadTo = 5,
    CubicTo = 6,
    SmoothQuadTo = 7,
    SmoothCubicTo = 8,
    SmallCcwArcTo = 9,
    SmallCwArcTo = 10,
    LargeCcwArcTo = 11,
    LargeCwArcTo = 12,
}

impl SegmentCommand {
    const TABLE: [SegmentCommand; 13] = [
        SegmentCommand::Close,
        SegmentCommand::MoveTo,
        SegmentCommand::LineTo,
        SegmentCommand::HLineTo,
        SegmentCommand::VLineTo,
        SegmentCommand::QuadTo,
        SegmentCommand::CubicTo,
        SegmentCommand::SmoothQuadTo,
        SegmentCommand::SmoothCubicTo,
        SegmentCommand::SmallCcwArcTo,
        SegmentCommand::SmallCwArcTo,
        SegmentCommand::LargeCcwArcTo,
        SegmentCommand::LargeCwArcTo,
    ];

    /// Number of coordinates the command consumes.
    #[inline]
    pub const fn arity(self) -> usize {
        match self {
            SegmentCommand::Close => 0,
            SegmentCommand::MoveTo | SegmentCommand::LineTo => 2,
            SegmentCommand::HLineTo | SegmentCommand::VLineTo => 1,
            SegmentCommand::QuadTo => 4,
            SegmentCommand::CubicTo => 6,
            SegmentCommand::SmoothQuadTo => 2,
            SegmentCommand::SmoothCubicTo => 4,
            SegmentCommand::SmallCcwArcTo
            | SegmentCommand::SmallCwArcTo
            | SegmentCommand::LargeCcwArcTo
            | SegmentCommand::LargeCwArcTo => 5,
        }
    }

    #[inline]
    pub const fn is_arc(self) -> bool {
        matches!(
            self,
            SegmentCommand::SmallCcwArcTo
                | SegmentCommand::SmallCwArcTo
                | SegmentCommand::LargeCcwArcTo
                | SegmentCommand::LargeCwArcTo
        )
    }
}

/// A command plus its absolute/relative flag.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct Segment {
    pub command: SegmentCommand,
    pub relative: bool,
}

impl Segment {
    pub const CLOSE: Segment = Segment::abs(SegmentCommand::Close);

    #[inline]
    pub const fn abs(command: SegmentCommand) -> Self {
        Self { command, relative: false }
    }

    #[inline]
    pub const fn rel(command: SegmentCommand) -> Self {
        Self { command, relative: true }
    }

    #[inline]
    pub const fn arity(self) -> usize {
        self.command.arity()
    }

    /// Decodes an OpenVG segment byte.
    pub fn from_byte(b: u8) -> VgResult<Self> {
        let command = SegmentCommand::TABLE
            .get((b >> 1) as usize)
            .copied()
            .ok_or(VgError::IllegalArgument("unknown path segment"))?;
        Ok(Self {
            command,
            relative: b & 1 == 1,
        })
    }

    #[inline]
    pub const fn to_byte(self) -> u8 {
        ((self.command as u8) << 1) | self.relative as u8
    }
}

/// Sum of arities over `segments`.
pub fn coord_count(segments: &[Segment]) -> usize {
    segments.iter().map(|s| s.arity()).sum()
}
