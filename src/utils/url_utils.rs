// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use url::{ParseError, Url};

/// 规范化URL，作为缓存与去重的键
///
/// 小写协议与主机名，去除片段与默认端口。`url` crate 在解析时已经
/// 完成大小写与默认端口的规范化，这里只需再剥离片段。
pub fn normalize_url(raw: &str) -> Result<Url, ParseError> {
    let mut url = Url::parse(raw.trim())?;
    url.set_fragment(None);
    Ok(url)
}

/// 将可能为相对路径的URL转换为绝对路径URL
pub fn resolve_url(base_url: &Url, path: &str) -> Result<Url, ParseError> {
    base_url.join(path)
}

/// 提取URL的主机键（host:port），politeness与robots缓存按此分组
pub fn host_key(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host,
    }
}
