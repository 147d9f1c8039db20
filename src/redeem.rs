use std::collections::HashMap;

use thiserror::Error;

pub const DEFAULT_ADMIN_CODE: &str = "admin123";

pub fn default_codes() -> Vec<(String, u64)> {
    vec![("bonus100".to_string(), 100), ("startbonus".to_string(), 500)]
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RedeemError {
    #[error("invalid code")]
    UnknownCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Redemption {
    /// The admin code. Nothing is credited or consumed.
    Admin,
    Credit(u64),
}

/// Process-wide bonus codes. Each code pays out once, to whoever redeems it
/// first.
#[derive(Debug)]
pub struct RedeemCodes {
    codes: HashMap<String, u64>,
    admin_code: String,
}

impl Default for RedeemCodes {
    fn default() -> Self {
        Self::new(default_codes(), DEFAULT_ADMIN_CODE)
    }
}

impl RedeemCodes {
    pub fn new(codes: impl IntoIterator<Item = (String, u64)>, admin_code: impl Into<String>) -> Self {
        RedeemCodes {
            codes: codes.into_iter().collect(),
            admin_code: admin_code.into(),
        }
    }

    pub fn redeem(&mut self, code: &str) -> Result<Redemption, RedeemError> {
        let code = code.trim();
        if !self.admin_code.is_empty() && code == self.admin_code {
            return Ok(Redemption::Admin);
        }
        self.codes
            .remove(code)
            .map(Redemption::Credit)
            .ok_or(RedeemError::UnknownCode)
    }

    pub fn remaining(&self) -> usize {
        self.codes.len()
    }
}
