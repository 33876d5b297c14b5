//! Storage-call location and argument splitting on a single line.
//!
//! A call is `storage.<ident>(` with `storage` not glued to a preceding
//! identifier. Arguments are split on top-level commas while tracking
//! `()[]{}` nesting and `'`/`"`/`` ` `` string literals, so
//! `getUser(parseInt(req.params.id))` is seen as one argument. When the
//! closing `)` is not on the line the call is *open* and only the arguments
//! seen so far are known. An open call ending in a top-level comma keeps an
//! empty last argument for the one that follows on the next line.

use std::ops::Range;

use memchr::memmem;

/// Where the tenant argument goes in a call's argument list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot
{
    /// Before every existing argument
    First,
    /// After every existing argument
    Last,
    /// Right after the n-th (1-based) argument
    After(usize),
}

/// One located `storage.method(...)` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageCall<'a>
{
    pub method: &'a str,
    /// Bytes between `(` and `)` (or end of line for open calls)
    pub inner: Range<usize>,
    /// Trimmed byte ranges of each argument
    pub args: Vec<Range<usize>>,
    /// Whether the closing `)` is on this line
    pub closed: bool,
}

/// A single byte-range replacement on the line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edit
{
    pub range: Range<usize>,
    pub text: String,
}

impl StorageCall<'_>
{
    pub fn arity(&self) -> usize
    {
        self.args
            .len()
    }

    /// True when some top-level argument already is `tenant`
    pub fn carries(
        &self,
        line: &str,
        tenant: &str,
    ) -> bool
    {
        self.args
            .iter()
            .any(|r| &line[r.clone()] == tenant)
    }

    /// Edit inserting `tenant` at `slot`, or `None` when the slot cannot be
    /// located on this line.
    pub fn edit(
        &self,
        slot: Slot,
        tenant: &str,
    ) -> Option<Edit>
    {
        if self
            .args
            .is_empty()
        {
            // Only a closed empty list is known to be empty
            return self
                .closed
                .then(|| Edit { range: self.inner.clone(), text: tenant.to_string() });
        }

        let after = |idx: usize| {
            let at = self.args[idx].end;
            Edit { range: at..at, text: format!(", {tenant}") }
        };

        match slot
        {
            Slot::First =>
            {
                let at = self.inner.start;
                Some(Edit { range: at..at, text: format!("{tenant}, ") })
            }
            Slot::After(n) if n >= 1 && n < self.arity() => Some(after(n - 1)),
            Slot::Last | Slot::After(_) => self
                .closed
                .then(|| after(self.arity() - 1)),
        }
    }
}

/// Locate every `<storage>.<method>(` call on `line`, left to right.
pub fn find_calls<'a>(
    line: &'a str,
    storage: &str,
) -> Vec<StorageCall<'a>>
{
    let bytes = line.as_bytes();
    let needle = format!("{storage}.");
    let mut calls = Vec::new();

    for pos in memmem::find_iter(bytes, needle.as_bytes())
    {
        // `userstorage.` or `$storage.` is some other object
        if pos > 0 && is_ident_byte(bytes[pos - 1])
        {
            continue;
        }

        let name_start = pos + needle.len();
        let name_len = bytes[name_start..]
            .iter()
            .take_while(|b| is_ident_byte(**b))
            .count();
        let name_end = name_start + name_len;

        if name_len == 0 || bytes.get(name_end) != Some(&b'(')
        {
            continue;
        }

        let (inner, args, closed) = split_args(line, name_end + 1);
        calls.push(StorageCall { method: &line[name_start..name_end], inner, args, closed });
    }

    calls
}

/// Apply non-overlapping insertions/replacements computed on `line`.
pub fn apply_edits(
    line: &str,
    mut edits: Vec<Edit>,
) -> String
{
    // Right to left so earlier offsets stay valid
    edits.sort_by(|a, b| {
        b.range
            .start
            .cmp(&a.range.start)
    });

    let mut out = line.to_string();
    for edit in edits
    {
        out.replace_range(edit.range, &edit.text);
    }
    out
}

fn is_ident_byte(b: u8) -> bool
{
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

/// Split the argument list starting right after `(` at `open`.
fn split_args(
    line: &str,
    open: usize,
) -> (Range<usize>, Vec<Range<usize>>, bool)
{
    let bytes = line.as_bytes();
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut escaped = false;
    let mut seg_start = open;
    let mut segments = Vec::new();
    let mut end = bytes.len();
    let mut closed = false;

    for (i, &b) in bytes
        .iter()
        .enumerate()
        .skip(open)
    {
        if let Some(q) = quote
        {
            if escaped
            {
                escaped = false;
            }
            else if b == b'\\'
            {
                escaped = true;
            }
            else if b == q
            {
                quote = None;
            }
            continue;
        }

        match b
        {
            b'\'' | b'"' | b'`' => quote = Some(b),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' | b'}' if depth > 0 => depth -= 1,
            b')' =>
            {
                end = i;
                closed = true;
                break;
            }
            // Stray closer: the call is malformed, stop here
            b']' | b'}' =>
            {
                end = i;
                break;
            }
            b',' if depth == 0 =>
            {
                segments.push(seg_start..i);
                seg_start = i + 1;
            }
            _ =>
            {}
        }
    }
    segments.push(seg_start..end);

    let mut args: Vec<Range<usize>> = segments
        .into_iter()
        .map(|r| trim_range(line, r))
        .collect();

    // `()` and a trailing `a, )` leave one empty segment. On an open call
    // `a,` the empty tail is the pending argument continued below.
    let pending = !closed && args.len() > 1;
    if !pending
        && args
            .last()
            .is_some_and(|r| r.is_empty())
    {
        args.pop();
    }

    (open..end, args, closed)
}

fn trim_range(
    line: &str,
    r: Range<usize>,
) -> Range<usize>
{
    let s = &line[r.clone()];
    let start = r.start + (s.len() - s.trim_start().len());
    let len = s.trim().len();
    start..start + len
}
