//! TLLV tag registry
//!
//! Tags are 8-byte big-endian identifiers. The registry below is closed:
//! anything else is still a valid [`Tag`], it just has no name and is carried
//! through untouched.

use std::fmt;

/// An 8-byte TLLV tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(pub u64);

impl Tag {
    // Tags sent by the client in the SPC
    pub const SESSION_KEY_R1: Tag = Tag(0x3d1a_10b8_bffa_c2ec);
    pub const SESSION_KEY_R1_INTEGRITY: Tag = Tag(0xb349_d480_9e91_0687);
    pub const ANTI_REPLAY_SEED: Tag = Tag(0x89c9_0f12_2041_06b2);
    pub const R2: Tag = Tag(0x71b5_595a_c152_1133);
    pub const RETURN_REQUEST: Tag = Tag(0x19f9_d4e5_ab76_09cb);
    pub const ASSET_ID: Tag = Tag(0x1bf7_f53f_5d5d_5a1f);
    pub const TRANSACTION_ID: Tag = Tag(0x47aa_7ad3_4405_77de);
    pub const PROTOCOL_VERSIONS_SUPPORTED: Tag = Tag(0x67b8_fb79_ecce_1a13);
    pub const PROTOCOL_VERSION_USED: Tag = Tag(0x5d81_bcbc_c7f6_1703);
    pub const STREAMING_INDICATOR: Tag = Tag(0xabb0_256a_3184_3974);
    pub const MEDIA_PLAYBACK_STATE: Tag = Tag(0xeb8e_fdf2_b25a_b3a0);

    // Tags produced by the server in the CKC
    pub const ENCRYPTED_CONTENT_KEY: Tag = Tag(0x58b3_8165_af0e_3d5a);
    pub const R1: Tag = Tag(0xea74_c464_5d5e_fee9);
    pub const CONTENT_KEY_DURATION: Tag = Tag(0x47ac_f6a4_18cd_091a);
    pub const HDCP_ENFORCEMENT: Tag = Tag(0x2e52_f153_0d8d_db4a);

    /// Tags every SPC must carry before a CKC can be built for it
    pub const MANDATORY_SPC: [Tag; 7] = [
        Tag::SESSION_KEY_R1,
        Tag::SESSION_KEY_R1_INTEGRITY,
        Tag::ANTI_REPLAY_SEED,
        Tag::R2,
        Tag::ASSET_ID,
        Tag::TRANSACTION_ID,
        Tag::RETURN_REQUEST,
    ];

    /// Size of a tag on the wire
    pub const SIZE: usize = 8;

    /// Registry name, if this tag is a known one
    pub fn name(self) -> Option<&'static str> {
        let name = match self {
            Tag::SESSION_KEY_R1 => "SessionKey_R1",
            Tag::SESSION_KEY_R1_INTEGRITY => "SessionKey_R1_integrity",
            Tag::ANTI_REPLAY_SEED => "AntiReplaySeed",
            Tag::R2 => "R2",
            Tag::RETURN_REQUEST => "ReturnRequest",
            Tag::ASSET_ID => "AssetID",
            Tag::TRANSACTION_ID => "TransactionID",
            Tag::PROTOCOL_VERSIONS_SUPPORTED => "ProtocolVersionsSupported",
            Tag::PROTOCOL_VERSION_USED => "ProtocolVersionUsed",
            Tag::STREAMING_INDICATOR => "StreamingIndicator",
            Tag::MEDIA_PLAYBACK_STATE => "MediaPlaybackState",
            Tag::ENCRYPTED_CONTENT_KEY => "EncryptedContentKey",
            Tag::R1 => "R1",
            Tag::CONTENT_KEY_DURATION => "ContentKeyDuration",
            Tag::HDCP_ENFORCEMENT => "HDCPEnforcement",
            _ => return None,
        };
        Some(name)
    }

    /// Whether the tag is in the registry
    pub fn is_known(self) -> bool {
        self.name().is_some()
    }

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Tag(u64::from_be_bytes(bytes))
    }

    /// Split a packed list of tags, as found in a return request
    ///
    /// Returns `None` when the input is not a whole number of tags.
    pub fn parse_list(bytes: &[u8]) -> Option<Vec<Tag>> {
        if bytes.len() % Self::SIZE != 0 {
            return None;
        }
        let tags = bytes
            .chunks_exact(Self::SIZE)
            .map(|chunk| {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(chunk);
                Tag::from_be_bytes(raw)
            })
            .collect();
        Some(tags)
    }
}

impl From<u64> for Tag {
    fn from(value: u64) -> Self {
        Tag(value)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0)
    }
}
