/*
 * // Copyright (c) Radzivon Bartoshyk 2/2025. All rights reserved.
 * //
 * // Redistribution and use in source and binary forms, with or without modification,
 * // are permitted provided that the following conditions are met:
 * //
 * // 1.  Redistributions of source code must retain the above copyright notice, this
 * // list of conditions and the following disclaimer.
 * //
 * // 2.  Redistributions in binary form must reproduce the above copyright notice,
 * // this list of conditions and the following disclaimer in the documentation
 * // and/or other materials provided with the distribution.
 * //
 * // 3.  Neither the name of the copyright holder nor the names of its
 * // contributors may be used to endorse or promote products derived from
 * // this software without specific prior written permission.
 * //
 * // THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS"
 * // AND ANY EXPRESS OR IMPLIED WARRANTIES, INCLUDING, BUT NOT LIMITED TO, THE
 * // IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
 * // DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE
 * // FOR ANY DIRECT, INDIRECT, INCIDENTAL, SPECIAL, EXEMPLARY, OR CONSEQUENTIAL
 * // DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
 * // SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER
 * // CAUSED AND ON ANY THEORY OF LIABILITY, WHETHER IN CONTRACT, STRICT LIABILITY,
 * // OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE USE
 * // OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.
 */
use crate::dat::ColorDateTime;
use crate::err::{CmsError, MalformedSize};
use crate::helpers::{read_u32_be, read_xyz};
use crate::matrix::Xyz;
use crate::writer::{write_u32_be, write_xyz};

pub(crate) const ACSP_SIGNATURE: u32 = u32::from_ne_bytes(*b"acsp").to_be(); // 'acsp' signature for ICC
pub(crate) const HEADER_SIZE: usize = 128;
/// Header plus the tag count.
pub(crate) const TAG_TABLE_OFFSET: usize = HEADER_SIZE + 4;

/// Limits applied while parsing untrusted profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ParsingOptions {
    /// Largest accepted profile in bytes.
    pub max_profile_size: usize,
    /// Largest accepted number of CLUT cells.
    pub max_allowed_clut_size: usize,
    /// Largest accepted number of entries in one sampled curve.
    pub max_allowed_trc_size: usize,
}

impl Default for ParsingOptions {
    fn default() -> Self {
        Self {
            max_profile_size: 1024 * 1024 * 10,
            max_allowed_clut_size: 1_000_000,
            max_allowed_trc_size: 40_000,
        }
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum DataColorSpace {
    #[default]
    Xyz,
    Lab,
    Rgb,
    Gray,
    Cmyk,
}

impl TryFrom<u32> for DataColorSpace {
    type Error = CmsError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == u32::from_ne_bytes(*b"XYZ ").to_be() {
            return Ok(DataColorSpace::Xyz);
        } else if value == u32::from_ne_bytes(*b"Lab ").to_be() {
            return Ok(DataColorSpace::Lab);
        } else if value == u32::from_ne_bytes(*b"RGB ").to_be() {
            return Ok(DataColorSpace::Rgb);
        } else if value == u32::from_ne_bytes(*b"GRAY").to_be() {
            return Ok(DataColorSpace::Gray);
        } else if value == u32::from_ne_bytes(*b"CMYK").to_be() {
            return Ok(DataColorSpace::Cmyk);
        }
        Err(CmsError::UnsupportedColorSpace(value))
    }
}

impl From<DataColorSpace> for u32 {
    fn from(val: DataColorSpace) -> Self {
        match val {
            DataColorSpace::Xyz => u32::from_ne_bytes(*b"XYZ ").to_be(),
            DataColorSpace::Lab => u32::from_ne_bytes(*b"Lab ").to_be(),
            DataColorSpace::Rgb => u32::from_ne_bytes(*b"RGB ").to_be(),
            DataColorSpace::Gray => u32::from_ne_bytes(*b"GRAY").to_be(),
            DataColorSpace::Cmyk => u32::from_ne_bytes(*b"CMYK").to_be(),
        }
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum ProfileClass {
    InputDevice,
    #[default]
    DisplayDevice,
    OutputDevice,
    ColorSpace,
}

impl TryFrom<u32> for ProfileClass {
    type Error = CmsError;
    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if value == u32::from_ne_bytes(*b"scnr").to_be() {
            return Ok(ProfileClass::InputDevice);
        } else if value == u32::from_ne_bytes(*b"mntr").to_be() {
            return Ok(ProfileClass::DisplayDevice);
        } else if value == u32::from_ne_bytes(*b"prtr").to_be() {
            return Ok(ProfileClass::OutputDevice);
        } else if value == u32::from_ne_bytes(*b"spac").to_be() {
            return Ok(ProfileClass::ColorSpace);
        }
        Err(CmsError::UnsupportedProfileClass(value))
    }
}

impl From<ProfileClass> for u32 {
    fn from(val: ProfileClass) -> Self {
        match val {
            ProfileClass::InputDevice => u32::from_ne_bytes(*b"scnr").to_be(),
            ProfileClass::DisplayDevice => u32::from_ne_bytes(*b"mntr").to_be(),
            ProfileClass::OutputDevice => u32::from_ne_bytes(*b"prtr").to_be(),
            ProfileClass::ColorSpace => u32::from_ne_bytes(*b"spac").to_be(),
        }
    }
}

#[derive(Debug, Copy, Clone, Ord, PartialOrd, Eq, PartialEq, Default, Hash)]
pub enum RenderingIntent {
    #[default]
    Perceptual = 0,
    RelativeColorimetric = 1,
    Saturation = 2,
    AbsoluteColorimetric = 3,
}

impl From<u32> for RenderingIntent {
    fn from(value: u32) -> Self {
        match value {
            1 => RenderingIntent::RelativeColorimetric,
            2 => RenderingIntent::Saturation,
            3 => RenderingIntent::AbsoluteColorimetric,
            _ => RenderingIntent::Perceptual,
        }
    }
}

/// Major and minor version packed as ICC stores them.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct ProfileVersion(pub u32);

impl ProfileVersion {
    pub const V2_1: ProfileVersion = ProfileVersion(0x0210_0000);
    pub const V4_0: ProfileVersion = ProfileVersion(0x0400_0000);
    pub const V4_3: ProfileVersion = ProfileVersion(0x0430_0000);

    #[inline]
    pub const fn major(self) -> u8 {
        (self.0 >> 24) as u8
    }
}

/// The fixed 128 byte profile header followed by the tag count.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct ProfileHeader {
    pub(crate) size: u32,
    pub(crate) cmm_type: u32,
    pub(crate) version: ProfileVersion,
    pub(crate) profile_class: u32,
    pub(crate) data_color_space: u32,
    pub(crate) pcs: u32,
    pub(crate) creation_date_time: ColorDateTime,
    pub(crate) signature: u32,
    pub(crate) platform: u32,
    pub(crate) flags: u32,
    pub(crate) device_manufacturer: u32,
    pub(crate) device_model: u32,
    pub(crate) device_attributes: u64,
    pub(crate) rendering_intent: RenderingIntent,
    pub(crate) illuminant: Xyz,
    pub(crate) creator: u32,
    pub(crate) profile_id: [u8; 16],
    pub(crate) tag_count: u32,
}

impl ProfileHeader {
    pub(crate) fn new_from_slice(slice: &[u8]) -> Result<ProfileHeader, CmsError> {
        if slice.len() < TAG_TABLE_OFFSET {
            return Err(CmsError::TruncatedProfile(MalformedSize {
                size: slice.len(),
                expected: TAG_TABLE_OFFSET,
            }));
        }
        let mut profile_id = [0u8; 16];
        profile_id.copy_from_slice(&slice[84..100]);
        Ok(ProfileHeader {
            size: read_u32_be(slice, 0)?,
            cmm_type: read_u32_be(slice, 4)?,
            version: ProfileVersion(read_u32_be(slice, 8)?),
            profile_class: read_u32_be(slice, 12)?,
            data_color_space: read_u32_be(slice, 16)?,
            pcs: read_u32_be(slice, 20)?,
            creation_date_time: ColorDateTime::new_from_slice(&slice[24..36])?,
            signature: read_u32_be(slice, 36)?,
            platform: read_u32_be(slice, 40)?,
            flags: read_u32_be(slice, 44)?,
            device_manufacturer: read_u32_be(slice, 48)?,
            device_model: read_u32_be(slice, 52)?,
            device_attributes: ((read_u32_be(slice, 56)? as u64) << 32)
                | read_u32_be(slice, 60)? as u64,
            rendering_intent: RenderingIntent::from(read_u32_be(slice, 64)?),
            illuminant: read_xyz(&slice[68..80])?,
            creator: read_u32_be(slice, 80)?,
            profile_id,
            tag_count: read_u32_be(slice, HEADER_SIZE)?,
        })
    }

    pub(crate) fn encode(&self, into: &mut Vec<u8>) {
        write_u32_be(into, self.size);
        write_u32_be(into, self.cmm_type);
        write_u32_be(into, self.version.0);
        write_u32_be(into, self.profile_class);
        write_u32_be(into, self.data_color_space);
        write_u32_be(into, self.pcs);
        self.creation_date_time.encode(into);
        write_u32_be(into, self.signature);
        write_u32_be(into, self.platform);
        write_u32_be(into, self.flags);
        write_u32_be(into, self.device_manufacturer);
        write_u32_be(into, self.device_model);
        write_u32_be(into, (self.device_attributes >> 32) as u32);
        write_u32_be(into, self.device_attributes as u32);
        write_u32_be(into, self.rendering_intent as u32);
        write_xyz(into, self.illuminant);
        write_u32_be(into, self.creator);
        into.extend_from_slice(&self.profile_id);
        into.extend_from_slice(&[0u8; 28]);
        write_u32_be(into, self.tag_count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures() {
        assert_eq!(ACSP_SIGNATURE, u32::from_be_bytes(*b"acsp"));
        for space in [
            DataColorSpace::Xyz,
            DataColorSpace::Lab,
            DataColorSpace::Rgb,
            DataColorSpace::Gray,
            DataColorSpace::Cmyk,
        ] {
            assert_eq!(DataColorSpace::try_from(u32::from(space)), Ok(space));
        }
        assert_eq!(
            ProfileClass::try_from(u32::from_be_bytes(*b"link")),
            Err(CmsError::UnsupportedProfileClass(u32::from_be_bytes(*b"link")))
        );
        assert_eq!(ProfileVersion::V4_3.major(), 4);
    }

    #[test]
    fn test_header_layout() {
        let header = ProfileHeader {
            size: 1000,
            cmm_type: 0,
            version: ProfileVersion::V4_3,
            profile_class: ProfileClass::DisplayDevice.into(),
            data_color_space: DataColorSpace::Rgb.into(),
            pcs: DataColorSpace::Xyz.into(),
            creation_date_time: ColorDateTime::now(),
            signature: ACSP_SIGNATURE,
            platform: 0,
            flags: 0,
            device_manufacturer: 0,
            device_model: 0,
            device_attributes: 0x0102_0304_0506_0708,
            rendering_intent: RenderingIntent::Perceptual,
            illuminant: Xyz::D50,
            creator: 0,
            profile_id: [0; 16],
            tag_count: 3,
        };
        let mut bytes = Vec::new();
        header.encode(&mut bytes);
        assert_eq!(bytes.len(), TAG_TABLE_OFFSET);
        assert_eq!(&bytes[36..40], b"acsp");
        let decoded = ProfileHeader::new_from_slice(&bytes).unwrap();
        assert_eq!(decoded, header);
        assert!(ProfileHeader::new_from_slice(&bytes[..100]).is_err());
    }
}
