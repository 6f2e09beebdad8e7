//! 地址轨迹解析
//!
//! 轨迹为空白分隔的十六进制地址，可带 `0x` 前缀；`#` 之后到行尾为注释。

use std::io::BufRead;
use std::num::IntErrorKind;

use thiserror::Error;

/// 轨迹解析错误
#[derive(Debug, Error)]
pub enum TraceError {
    #[error("line {line}: `{token}` is not a hexadecimal address")]
    InvalidAddress { line: usize, token: String },

    #[error("line {line}: address `{token}` does not fit in 32 bits")]
    OutOfRange { line: usize, token: String },

    #[error("failed to read trace: {0}")]
    Io(#[from] std::io::Error),
}

/// 解析单个十六进制地址
fn parse_address(token: &str, line: usize) -> Result<u32, TraceError> {
    let digits = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
        .unwrap_or(token);

    u32::from_str_radix(digits, 16).map_err(|e| match e.kind() {
        IntErrorKind::PosOverflow => TraceError::OutOfRange {
            line,
            token: token.to_string(),
        },
        _ => TraceError::InvalidAddress {
            line,
            token: token.to_string(),
        },
    })
}

/// 读取整个轨迹
pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<u32>, TraceError> {
    let mut addresses = Vec::new();

    for (index, line) in reader.lines().enumerate() {
        let line = line?;
        let content = line.split('#').next().unwrap_or_default();
        for token in content.split_whitespace() {
            addresses.push(parse_address(token, index + 1)?);
        }
    }

    log::debug!("Parsed {} addresses from trace", addresses.len());
    Ok(addresses)
}
