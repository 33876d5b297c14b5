//! Route-handler scanner and per-line call rewriter.
//!
//! Single forward pass over the file's lines:
//! - a registration line (`  app.get(`, ...) opens a handler context;
//! - lines are copied until the `async (req, res) => {` signature;
//! - a brace-balanced lookahead classifies the body without consuming it,
//!   starting with the signature line's text after its `{`;
//! - a `const tenantId = req.tenantId!;` line is injected when the body
//!   awaits storage and has no declaration yet (never in the login handler);
//!   when such a call sits on the signature line the declaration is spliced
//!   in right after the `{` instead;
//! - the signature line and every later line containing `await storage.` go
//!   through the rule tiers.
//!
//! Output only ever gains lines; each input line is emitted exactly once, in
//! order, verbatim or rewritten.

use memchr::memchr_iter;
use tracing::{debug, info, instrument, trace, warn};

use crate::core::error::RewriteError;
use crate::core::patterns::{LinePatterns, indent_width};
use crate::core::rules::{RuleHit, rewrite_line};
use crate::infra::config::RewriteConfig;
use crate::infra::io::{join_lines, split_lines};

/// State of the handler currently being scanned
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandlerContext
{
    /// Index of the registration line
    pub start: usize,
    /// Leading whitespace of the signature line
    pub indent: usize,
    pub is_login: bool,
    pub has_declaration: bool,
    pub has_storage_call: bool,
}

/// What the non-consuming lookahead saw in a handler body
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BodyScan
{
    pub has_storage_call: bool,
    pub has_declaration: bool,
    /// Brace balance reached zero before end of input
    pub closed: bool,
    /// An awaited storage call sits on the signature line itself
    pub call_on_signature: bool,
}

/// Counters for one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RewriteReport
{
    pub handlers: usize,
    /// Declaration lines added after a signature
    pub injected: usize,
    /// Declarations spliced into the signature line of a one-line body
    pub inlined: usize,
    pub rewritten_lines: usize,
    pub rewritten_calls: usize,
    pub unclosed_handlers: usize,
    pub login_lookups_skipped: usize,
}

/// Output lines plus the pass report
#[derive(Debug, Clone)]
pub struct Rewrite
{
    pub lines: Vec<String>,
    pub report: RewriteReport,
}

pub struct Scanner<'a>
{
    cfg: &'a RewriteConfig,
    patterns: LinePatterns,
    /// `storage.`, used by the lookahead
    call_hint: String,
    /// `await storage.`, gate for the rule tiers
    awaited_marker: String,
}

impl<'a> Scanner<'a>
{
    pub fn new(cfg: &'a RewriteConfig) -> Result<Self, RewriteError>
    {
        Ok(Self {
            cfg,
            patterns: LinePatterns::new(cfg)?,
            call_hint: format!("{}.", cfg.storage_ident),
            awaited_marker: cfg.awaited_call_marker(),
        })
    }

    /// Rewrite a whole file's lines.
    #[instrument(skip_all, fields(lines = lines.len()))]
    pub fn rewrite(
        &self,
        lines: &[String],
    ) -> Result<Rewrite, RewriteError>
    {
        let mut out = Vec::with_capacity(lines.len() + lines.len() / 8);
        let mut report = RewriteReport::default();
        let mut in_login = false;
        let mut i = 0;

        while i < lines.len()
        {
            let line = &lines[i];

            if self
                .patterns
                .is_route_start(line)
            {
                let mut ctx = HandlerContext {
                    start: i,
                    is_login: self
                        .patterns
                        .is_login_route(line),
                    ..Default::default()
                };
                report.handlers += 1;

                i = self.enter_handler(lines, &mut ctx, &mut out, &mut report)?;
                in_login = ctx.is_login;
                continue;
            }

            self.emit_line(line, in_login, i, &mut out, &mut report);
            i += 1;
        }

        info!(
            handlers = report.handlers,
            injected = report.injected,
            inlined = report.inlined,
            rewritten_lines = report.rewritten_lines,
            unclosed = report.unclosed_handlers,
            "rewrite pass complete"
        );

        Ok(Rewrite { lines: out, report })
    }

    /// Copy from the registration line through the signature, inject the
    /// declaration if needed, and return the next unconsumed index.
    fn enter_handler(
        &self,
        lines: &[String],
        ctx: &mut HandlerContext,
        out: &mut Vec<String>,
        report: &mut RewriteReport,
    ) -> Result<usize, RewriteError>
    {
        let mut i = ctx.start;

        while i < lines.len()
        {
            let line = &lines[i];
            i += 1;

            let Some(body_at) = self
                .patterns
                .signature_end(line)
            else
            {
                out.push(line.clone());
                continue;
            };

            ctx.indent = indent_width(line);
            let eol = if line.ends_with('\r') { "\r" } else { "" };
            let scan = self.scan_body(&line[body_at..], lines, i);
            ctx.has_storage_call = scan.has_storage_call;
            ctx.has_declaration = scan.has_declaration;

            if !scan.closed
            {
                report.unclosed_handlers += 1;
                if self
                    .cfg
                    .strict_unclosed
                {
                    return Err(RewriteError::UnclosedHandler { line: ctx.start + 1 });
                }
                warn!(line = ctx.start + 1, "handler body never closes; not injecting a declaration");
                self.emit_line(line, ctx.is_login, i - 1, out, report);
                return Ok(i);
            }

            let needs_declaration = ctx.has_storage_call && !ctx.has_declaration && !ctx.is_login;

            if needs_declaration && scan.call_on_signature
            {
                // The body starts on the signature line, so the declaration goes there too
                let spliced = format!(
                    "{} {}{}",
                    &line[..body_at],
                    self.cfg
                        .declaration_statement(),
                    &line[body_at..]
                );
                self.emit_line(&spliced, ctx.is_login, i - 1, out, report);
                report.inlined += 1;
                debug!(line = ctx.start + 1, "inlined tenant declaration on signature line");
                return Ok(i);
            }

            self.emit_line(line, ctx.is_login, i - 1, out, report);

            if needs_declaration
            {
                while i < lines.len() && matches!(lines[i].trim(), "try {" | "")
                {
                    out.push(lines[i].clone());
                    i += 1;
                }
                // Match the signature's line ending
                let declaration = self.cfg.scoping_declaration(ctx.indent);
                out.push(format!("{declaration}{eol}"));
                report.injected += 1;
                debug!(line = ctx.start + 1, "injected tenant declaration");
            }
            else
            {
                debug!(
                    line = ctx.start + 1,
                    storage = ctx.has_storage_call,
                    declared = ctx.has_declaration,
                    login = ctx.is_login,
                    "no declaration needed"
                );
            }
            return Ok(i);
        }

        debug!(line = ctx.start + 1, "registration without handler signature");
        Ok(i)
    }

    /// Inspect the body until its braces balance. `head` is the signature
    /// line's text after the opening `{`; `from` is the next line.
    pub fn scan_body(
        &self,
        head: &str,
        lines: &[String],
        from: usize,
    ) -> BodyScan
    {
        let mut balance: isize = 1;
        let mut scan = BodyScan::default();

        let body = std::iter::once(head).chain(
            lines
                .iter()
                .skip(from)
                .map(String::as_str),
        );

        for (n, line) in body.enumerate()
        {
            let bytes = line.as_bytes();
            balance += memchr_iter(b'{', bytes).count() as isize;
            balance -= memchr_iter(b'}', bytes).count() as isize;

            if line.contains(&self.call_hint) && line.contains("await")
            {
                scan.has_storage_call = true;
                scan.call_on_signature |= n == 0;
            }
            if self
                .patterns
                .is_declaration(line)
            {
                scan.has_declaration = true;
            }
            if balance <= 0
            {
                scan.closed = true;
                break;
            }
        }

        scan
    }

    /// Push `line`, rewritten if a rule applies to it.
    fn emit_line(
        &self,
        line: &str,
        in_login: bool,
        index: usize,
        out: &mut Vec<String>,
        report: &mut RewriteReport,
    )
    {
        match self.rewrite_call_line(line, in_login, report)
        {
            Some(hit) =>
            {
                trace!(line = index + 1, tier = %hit.tier, "rewrote storage call");
                report.rewritten_lines += 1;
                report.rewritten_calls += hit.calls;
                out.push(hit.line);
            }
            None => out.push(line.to_string()),
        }
    }

    /// Apply the rule tiers to one line outside handler detection.
    pub fn rewrite_call_line(
        &self,
        line: &str,
        in_login: bool,
        report: &mut RewriteReport,
    ) -> Option<RuleHit>
    {
        if !line.contains(&self.awaited_marker)
        {
            return None;
        }
        if in_login && line.contains(&self.cfg.login_lookup)
        {
            report.login_lookups_skipped += 1;
            return None;
        }
        rewrite_line(line, &self.cfg.storage_ident, &self.cfg.tenant_ident)
    }
}

/// Rewrite `lines` with a fresh scanner.
pub fn rewrite_lines(
    lines: &[String],
    cfg: &RewriteConfig,
) -> Result<Rewrite, RewriteError>
{
    Scanner::new(cfg)?.rewrite(lines)
}

/// Rewrite a whole source text, preserving its line endings.
pub fn rewrite_source(
    source: &str,
    cfg: &RewriteConfig,
) -> Result<String, RewriteError>
{
    let rewrite = rewrite_lines(&split_lines(source), cfg)?;
    Ok(join_lines(&rewrite.lines))
}
