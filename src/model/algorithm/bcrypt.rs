use serde::{Deserialize, Serialize};
use super::{encode_salt, random_salt, HashedPassword};
use crate::utils::errors::CredentialError;

// bcrypt fixes its salt at 16 bytes.
const SALT_LEN: usize = 16;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq)]
pub enum BCryptVersion {
    TwoA,
    TwoB,
    TwoX,
    TwoY
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BCryptPolicy {
    pub version: BCryptVersion,
    pub cost: u32
}

pub fn validate(phc: &str, plain_text_password: &str) -> Result<bool, CredentialError> {
    bcrypt::verify(plain_text_password, phc).map_err(CredentialError::from)
}

impl Default for BCryptPolicy {
    fn default() -> Self {
        Self {
            version: BCryptVersion::TwoB,
            cost: bcrypt::DEFAULT_COST
        }
    }
}

impl BCryptPolicy {
    pub fn hash_into_phc(&self, plain_text_password: &str) -> Result<HashedPassword, CredentialError> {
        let salt = random_salt::<SALT_LEN>();
        let hashed = bcrypt::hash_with_salt(plain_text_password, self.cost, salt)?;

        Ok(HashedPassword {
            hash: hashed.format_for_version(self.version.into()),
            salt: encode_salt(&salt),
        })
    }
}

impl From<BCryptVersion> for bcrypt::Version {
    fn from(version: BCryptVersion) -> Self {
        match version {
            BCryptVersion::TwoA => bcrypt::Version::TwoA,
            BCryptVersion::TwoB => bcrypt::Version::TwoB,
            BCryptVersion::TwoX => bcrypt::Version::TwoX,
            BCryptVersion::TwoY => bcrypt::Version::TwoY,
        }
    }
}
