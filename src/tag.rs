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
/// Size of one tag table entry: signature, offset and size.
pub(crate) const TAG_SIZE: usize = 12;

pub(crate) const R_TAG_XYZ: u32 = u32::from_ne_bytes(*b"rXYZ").to_be();
pub(crate) const G_TAG_XYZ: u32 = u32::from_ne_bytes(*b"gXYZ").to_be();
pub(crate) const B_TAG_XYZ: u32 = u32::from_ne_bytes(*b"bXYZ").to_be();
pub(crate) const R_TAG_TRC: u32 = u32::from_ne_bytes(*b"rTRC").to_be();
pub(crate) const G_TAG_TRC: u32 = u32::from_ne_bytes(*b"gTRC").to_be();
pub(crate) const B_TAG_TRC: u32 = u32::from_ne_bytes(*b"bTRC").to_be();
pub(crate) const K_TAG_TRC: u32 = u32::from_ne_bytes(*b"kTRC").to_be();
pub(crate) const WT_PT_TAG: u32 = u32::from_ne_bytes(*b"wtpt").to_be();
pub(crate) const CICP_TAG: u32 = u32::from_ne_bytes(*b"cicp").to_be();
pub(crate) const CHAD_TAG: u32 = u32::from_ne_bytes(*b"chad").to_be();
pub(crate) const A2B0_TAG: u32 = u32::from_ne_bytes(*b"A2B0").to_be();
pub(crate) const B2A0_TAG: u32 = u32::from_ne_bytes(*b"B2A0").to_be();
pub(crate) const DESC_TAG: u32 = u32::from_ne_bytes(*b"desc").to_be();
pub(crate) const CPRT_TAG: u32 = u32::from_ne_bytes(*b"cprt").to_be();
// Apple's parametric replacements for rTRC, gTRC and bTRC
pub(crate) const APPLE_R_TAG_TRC: u32 = u32::from_ne_bytes(*b"aarg").to_be();
pub(crate) const APPLE_G_TAG_TRC: u32 = u32::from_ne_bytes(*b"aagg").to_be();
pub(crate) const APPLE_B_TAG_TRC: u32 = u32::from_ne_bytes(*b"aabg").to_be();

/// Tag payload types this crate reads and writes.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub(crate) enum TagTypeDefinition {
    Xyz,
    Curve,
    ParametricCurve,
    Description,
    MultiLocalizedUnicode,
    Text,
    Lut8,
    Lut16,
    MabLut,
    MbaLut,
    S15Fixed16Array,
    Cicp,
    NotAllowed(u32),
}

impl From<u32> for TagTypeDefinition {
    fn from(value: u32) -> Self {
        if value == u32::from_ne_bytes(*b"XYZ ").to_be() {
            return TagTypeDefinition::Xyz;
        } else if value == u32::from_ne_bytes(*b"curv").to_be() {
            return TagTypeDefinition::Curve;
        } else if value == u32::from_ne_bytes(*b"para").to_be() {
            return TagTypeDefinition::ParametricCurve;
        } else if value == u32::from_ne_bytes(*b"desc").to_be() {
            return TagTypeDefinition::Description;
        } else if value == u32::from_ne_bytes(*b"mluc").to_be() {
            return TagTypeDefinition::MultiLocalizedUnicode;
        } else if value == u32::from_ne_bytes(*b"text").to_be() {
            return TagTypeDefinition::Text;
        } else if value == u32::from_ne_bytes(*b"mft1").to_be() {
            return TagTypeDefinition::Lut8;
        } else if value == u32::from_ne_bytes(*b"mft2").to_be() {
            return TagTypeDefinition::Lut16;
        } else if value == u32::from_ne_bytes(*b"mAB ").to_be() {
            return TagTypeDefinition::MabLut;
        } else if value == u32::from_ne_bytes(*b"mBA ").to_be() {
            return TagTypeDefinition::MbaLut;
        } else if value == u32::from_ne_bytes(*b"sf32").to_be() {
            return TagTypeDefinition::S15Fixed16Array;
        } else if value == u32::from_ne_bytes(*b"cicp").to_be() {
            return TagTypeDefinition::Cicp;
        }
        TagTypeDefinition::NotAllowed(value)
    }
}

impl From<TagTypeDefinition> for u32 {
    fn from(value: TagTypeDefinition) -> Self {
        match value {
            TagTypeDefinition::Xyz => u32::from_ne_bytes(*b"XYZ ").to_be(),
            TagTypeDefinition::Curve => u32::from_ne_bytes(*b"curv").to_be(),
            TagTypeDefinition::ParametricCurve => u32::from_ne_bytes(*b"para").to_be(),
            TagTypeDefinition::Description => u32::from_ne_bytes(*b"desc").to_be(),
            TagTypeDefinition::MultiLocalizedUnicode => u32::from_ne_bytes(*b"mluc").to_be(),
            TagTypeDefinition::Text => u32::from_ne_bytes(*b"text").to_be(),
            TagTypeDefinition::Lut8 => u32::from_ne_bytes(*b"mft1").to_be(),
            TagTypeDefinition::Lut16 => u32::from_ne_bytes(*b"mft2").to_be(),
            TagTypeDefinition::MabLut => u32::from_ne_bytes(*b"mAB ").to_be(),
            TagTypeDefinition::MbaLut => u32::from_ne_bytes(*b"mBA ").to_be(),
            TagTypeDefinition::S15Fixed16Array => u32::from_ne_bytes(*b"sf32").to_be(),
            TagTypeDefinition::Cicp => u32::from_ne_bytes(*b"cicp").to_be(),
            TagTypeDefinition::NotAllowed(v) => v,
        }
    }
}
