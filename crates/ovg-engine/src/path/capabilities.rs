use bitflags::bitflags;

bitflags! {
    /// Operations a path permits. Checked on every call that needs them.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PathCapabilities: u32 {
        const APPEND_FROM = 1 << 0;
        const APPEND_TO = 1 << 1;
        const MODIFY = 1 << 2;
        const TRANSFORM_FROM = 1 << 3;
        const TRANSFORM_TO = 1 << 4;
        const INTERPOLATE_FROM = 1 << 5;
        const INTERPOLATE_TO = 1 << 6;
        const PATH_LENGTH = 1 << 7;
        const POINT_ALONG_PATH = 1 << 8;
        const TANGENT_ALONG_PATH = 1 << 9;
        const PATH_BOUNDS = 1 << 10;
        const PATH_TRANSFORMED_BOUNDS = 1 << 11;
    }
}

impl PathCapabilities {
    /// Masks a raw OpenVG bitfield to the known bits.
    #[inline]
    pub fn from_raw(bits: u32) -> Self {
        Self::from_bits_truncate(bits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_bits_are_masked() {
        let caps = PathCapabilities::from_raw(0xffff_ffff);
        assert_eq!(caps, PathCapabilities::all());
        assert_eq!(caps.bits(), (1 << 12) - 1);
    }
}
