//! Redis key 规则
//!
//! `{namespace}:{provider}:{user_id}:{kind}` 和 `code:{provider}:{code}`。
//! provider / user_id / code 不做转义，调用方需保证其中不含 `:`。

use std::fmt;

/// Token key 命名空间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenNamespace {
    /// 本服务签发的会话 Token
    Session,
    /// OAuth 提供方返回的原始 Token
    OAuth,
}

impl TokenNamespace {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenNamespace::Session => "token",
            TokenNamespace::OAuth => "oauth",
        }
    }
}

impl fmt::Display for TokenNamespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token 类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const AUTHORIZATION_CODE_PREFIX: &str = "code";

pub fn token_key(
    namespace: TokenNamespace,
    provider: &str,
    user_id: &str,
    kind: TokenKind,
) -> String {
    format!("{}:{}:{}:{}", namespace, provider, user_id, kind)
}

pub fn authorization_code_key(provider: &str, code: &str) -> String {
    format!("{}:{}:{}", AUTHORIZATION_CODE_PREFIX, provider, code)
}
