//! 请求参数校验，在访问存储之前拒绝非法输入

use url::Url;

use crate::errors::{Result, ShortUrlError};

/// 原始 URL 必须是带 scheme 的绝对 URL
pub fn validate_url(original_url: &str) -> Result<()> {
    let trimmed = original_url.trim();
    if trimmed.is_empty() {
        return Err(ShortUrlError::invalid_url("URL cannot be empty"));
    }
    if trimmed.len() != original_url.len() {
        return Err(ShortUrlError::invalid_url(
            "URL must not have leading or trailing whitespace",
        ));
    }

    Url::parse(original_url)
        .map_err(|e| ShortUrlError::invalid_url(format!("{}: {}", original_url, e)))?;
    Ok(())
}

pub fn validate_owner(owner_id: &str) -> Result<()> {
    if owner_id.trim().is_empty() {
        return Err(ShortUrlError::validation("owner id cannot be empty"));
    }
    Ok(())
}

pub fn validate_delete(codes: &[String], owner_id: &str) -> Result<()> {
    validate_owner(owner_id)?;
    if codes.is_empty() {
        return Err(ShortUrlError::validation("no codes to delete"));
    }
    if codes.iter().any(|c| c.trim().is_empty()) {
        return Err(ShortUrlError::validation("codes cannot be empty"));
    }
    Ok(())
}
