//! Compiled line classifiers for handler detection.

use regex::Regex;

use crate::core::error::RewriteError;
use crate::infra::config::RewriteConfig;

/// The three regexes the scanner tests whole lines against.
#[derive(Debug)]
pub struct LinePatterns
{
    /// `^  app\.(get|post|...)\(`
    route_start: Regex,
    /// `async (req, res) => {`
    signature: Regex,
    /// `const tenantId = req.tenantId`
    declaration: Regex,
    login_marker: String,
}

impl LinePatterns
{
    pub fn new(cfg: &RewriteConfig) -> Result<Self, RewriteError>
    {
        let verbs = cfg
            .http_verbs
            .iter()
            .map(|v| regex::escape(v))
            .collect::<Vec<_>>()
            .join("|");

        let route_start = Regex::new(&format!(
            r"^{}{}\.(?:{})\(",
            " ".repeat(cfg.route_indent),
            regex::escape(&cfg.router_ident),
            verbs
        ))?;

        let signature = Regex::new(r"async\s*\(req,\s*res\)\s*=>\s*\{")?;

        let declaration = Regex::new(&format!(
            r"const\s+{}\s*=\s*{}",
            regex::escape(&cfg.tenant_ident),
            regex::escape(&cfg.request_field)
        ))?;

        Ok(Self { route_start, signature, declaration, login_marker: cfg.login_marker.clone() })
    }

    pub fn is_route_start(
        &self,
        line: &str,
    ) -> bool
    {
        self.route_start
            .is_match(line)
    }

    pub fn is_login_route(
        &self,
        line: &str,
    ) -> bool
    {
        line.contains(&self.login_marker)
    }

    /// Byte offset just past the signature's opening `{`
    pub fn signature_end(
        &self,
        line: &str,
    ) -> Option<usize>
    {
        self.signature
            .find(line)
            .map(|m| m.end())
    }

    pub fn is_declaration(
        &self,
        line: &str,
    ) -> bool
    {
        self.declaration
            .is_match(line)
    }
}

/// Width of the leading whitespace of `line`
pub fn indent_width(line: &str) -> usize
{
    line.len() - line.trim_start().len()
}
