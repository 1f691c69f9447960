//! Note-selection patterns shared by include/exclude filters and ignore lists.
//!
//! A pattern is a single term or a boolean expression over terms. Terms:
//! - `tag:<name>` matches notes carrying the tag (case-insensitive)
//! - `find:<words>` fuzzy path match: every word, in order, at a word boundary
//!   (`find:dir/words` pins the first folder; `*` and `?` switch to wildcards)
//! - `<key>:<value>` matches a frontmatter property (case-insensitive; list
//!   values match on any element, `[[link|alias]]` values on the link)
//! - anything containing `*`, `?`, `[` or `{` is a glob over the normalized path
//! - everything else is a folder prefix, or an exact note once `.md` is appended
//!
//! Terms combine with `AND`, `OR`, `NOT` (or `&&`, `||`, `!`) and parentheses.
//! Adjacent terms without an operator are ORed. `NOT` binds tightest, then
//! `AND`, then `OR`.

use crate::error::{Error, Result};
use crate::models::{NoteEntry, add_md_suffix, normalize_tag};
use globset::{GlobBuilder, GlobMatcher};
use serde_json::Value;

const GLOB_META: &[char] = &['*', '?', '[', '{'];

/// What a pattern can look at
#[derive(Debug, Clone, Copy)]
pub struct NoteView<'a> {
    pub path: &'a str,
    pub tags: &'a [String],
    pub frontmatter: Option<&'a Value>,
}

impl<'a> NoteView<'a> {
    /// A bare path, before the note has been parsed
    pub fn path(path: &'a str) -> Self {
        Self {
            path,
            tags: &[],
            frontmatter: None,
        }
    }
}

impl<'a> From<&'a NoteEntry> for NoteView<'a> {
    fn from(note: &'a NoteEntry) -> Self {
        Self {
            path: &note.path,
            tags: &note.tags,
            frontmatter: note.frontmatter.as_ref(),
        }
    }
}

/// A single compiled term
#[derive(Debug, Clone)]
pub enum NotePattern {
    Tag(String),
    Find(FindTerm),
    Property { key: String, value: String },
    Glob { source: String, matcher: GlobMatcher },
    Path(String),
}

impl NotePattern {
    /// Compile one term
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_pattern(raw, "empty pattern"));
        }

        if let Some(tag) = trimmed.strip_prefix("tag:") {
            let tag = normalize_tag(unquote(tag));
            if tag.is_empty() || tag == "*" {
                return Err(Error::invalid_pattern(
                    raw,
                    "tag cannot be empty or a wildcard",
                ));
            }
            return Ok(NotePattern::Tag(tag));
        }

        if let Some(term) = trimmed.strip_prefix("find:") {
            return FindTerm::parse(raw, unquote(term)).map(NotePattern::Find);
        }

        if let Some((key, value)) = trimmed.split_once(':')
            && !key.contains('/')
            && !key.contains(GLOB_META)
        {
            let key = key.trim().to_lowercase();
            let value = normalize_property_value(unquote(value));
            if key.is_empty() || value.is_empty() || value == "*" {
                return Err(Error::invalid_pattern(
                    raw,
                    "property patterns need both a key and a value",
                ));
            }
            return Ok(NotePattern::Property { key, value });
        }

        let path = trimmed.replace('\\', "/");
        let path = path.trim_start_matches("./").trim_start_matches('/');

        if path.contains(GLOB_META) {
            let glob = GlobBuilder::new(path)
                .literal_separator(false)
                .build()
                .map_err(|e| Error::invalid_pattern(raw, e.to_string()))?;
            return Ok(NotePattern::Glob {
                source: path.to_string(),
                matcher: glob.compile_matcher(),
            });
        }

        Ok(NotePattern::Path(path.trim_end_matches('/').to_string()))
    }

    /// Whether the term selects the note
    pub fn matches(&self, note: &NoteView<'_>) -> bool {
        match self {
            NotePattern::Tag(tag) => note.tags.iter().any(|t| normalize_tag(t) == *tag),
            NotePattern::Find(term) => term.matches(note.path),
            NotePattern::Property { key, value } => {
                property_matches(note.frontmatter, key, value)
            }
            NotePattern::Glob { matcher, .. } => matcher.is_match(note.path),
            NotePattern::Path(prefix) => matches_path(prefix, note.path),
        }
    }

    /// True when the term looks past the path
    pub fn needs_content(&self) -> bool {
        matches!(self, NotePattern::Tag(_) | NotePattern::Property { .. })
    }

    /// Pattern text (normalized)
    pub fn as_str(&self) -> String {
        match self {
            NotePattern::Tag(tag) => format!("tag:{}", tag),
            NotePattern::Find(term) => format!("find:{}", term.term),
            NotePattern::Property { key, value } => format!("{}:{}", key, value),
            NotePattern::Glob { source, .. } => source.clone(),
            NotePattern::Path(prefix) => prefix.clone(),
        }
    }
}

/// A `find:` term
#[derive(Debug, Clone)]
pub struct FindTerm {
    term: String,
    wildcard: Option<GlobMatcher>,
}

impl FindTerm {
    fn parse(raw: &str, term: &str) -> Result<Self> {
        let term = term.trim().to_lowercase();
        if term.is_empty() || term == "*" {
            return Err(Error::invalid_pattern(
                raw,
                "find cannot be empty or a wildcard",
            ));
        }
        if term.matches('/').count() > 1 {
            return Err(Error::invalid_pattern(
                raw,
                "find supports a single folder level",
            ));
        }

        let wildcard = if term.contains(['*', '?']) {
            let source = if term.contains('/') {
                term.clone()
            } else {
                format!("*{}*", term)
            };
            let glob = GlobBuilder::new(&source)
                .case_insensitive(true)
                .literal_separator(false)
                .build()
                .map_err(|e| Error::invalid_pattern(raw, e.to_string()))?;
            Some(glob.compile_matcher())
        } else {
            None
        };

        Ok(Self { term, wildcard })
    }

    pub fn matches(&self, path: &str) -> bool {
        if let Some(glob) = &self.wildcard {
            return glob.is_match(path);
        }
        let path = path.to_lowercase();

        if let Some((dir, rest)) = self.term.split_once('/') {
            let (first, remainder) = match path.split_once('/') {
                Some((first, remainder)) => (first, Some(remainder)),
                None => (path.as_str(), None),
            };
            let dir_matches = if dir.chars().count() == 1 {
                first.starts_with(dir)
            } else {
                first == dir
            };
            if !dir_matches {
                return false;
            }
            return rest.is_empty() || remainder.is_some_and(|r| words_in_order(rest, r));
        }

        if self.term.contains('.') {
            return path.split('/').any(|segment| words_in_order(&self.term, segment));
        }
        words_in_order(&self.term, &path)
    }
}

fn words_in_order(pattern: &str, text: &str) -> bool {
    let words = pattern
        .split(|c: char| c.is_whitespace() || matches!(c, '-' | '_' | '.'))
        .filter(|w| !w.is_empty());

    let mut rest = text;
    for word in words {
        loop {
            let Some(idx) = rest.find(word) else {
                return false;
            };
            let at_boundary = rest[..idx].chars().next_back().is_none_or(is_delimiter);
            if at_boundary {
                rest = &rest[idx + word.len()..];
                break;
            }
            let step = rest[idx..].chars().next().map_or(1, char::len_utf8);
            rest = &rest[idx + step..];
        }
    }
    true
}

fn is_delimiter(c: char) -> bool {
    matches!(c, '/' | '-' | '_' | ' ' | '.' | ',' | '(' | ')')
}

fn unquote(value: &str) -> &str {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Lowercase, trim, and reduce `[[target|alias]]` to `target`
pub fn normalize_property_value(value: &str) -> String {
    let mut value = value.trim().to_lowercase();
    if let Some(inner) = value
        .strip_prefix("[[")
        .and_then(|v| v.strip_suffix("]]"))
    {
        value = inner.to_string();
    }
    if let Some((target, _)) = value.split_once('|') {
        value = target.trim().to_string();
    }
    value
}

fn property_matches(frontmatter: Option<&Value>, key: &str, target: &str) -> bool {
    let Some(Value::Object(map)) = frontmatter else {
        return false;
    };
    map.iter()
        .filter(|(k, _)| k.trim().to_lowercase() == key)
        .any(|(_, v)| value_matches(v, target))
}

fn value_matches(value: &Value, target: &str) -> bool {
    match value {
        Value::String(s) => normalize_property_value(s) == target,
        Value::Number(n) => n.to_string() == target,
        Value::Bool(b) => b.to_string() == target,
        Value::Array(items) => items.iter().any(|v| value_matches(v, target)),
        _ => false,
    }
}

fn matches_path(prefix: &str, path: &str) -> bool {
    if prefix.is_empty() {
        return false;
    }
    if path == prefix || path == add_md_suffix(prefix) {
        return true;
    }
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.starts_with('/'))
}

/// A boolean combination of terms
#[derive(Debug, Clone)]
pub enum PatternExpr {
    Term(NotePattern),
    Not(Box<PatternExpr>),
    And(Box<PatternExpr>, Box<PatternExpr>),
    Or(Box<PatternExpr>, Box<PatternExpr>),
}

impl PatternExpr {
    /// Compile a term or expression
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Error::invalid_pattern(raw, "empty pattern"));
        }

        let tokens = tokenize(trimmed);
        if tokens.iter().all(|t| matches!(t, Token::Term(_))) {
            return NotePattern::parse(trimmed).map(PatternExpr::Term);
        }

        let mut parser = ExprParser {
            raw,
            tokens: insert_implicit_or(tokens),
            pos: 0,
        };
        let expr = parser.or()?;
        if let Some(token) = parser.tokens.get(parser.pos) {
            return Err(Error::invalid_pattern(
                raw,
                format!("unexpected token {}", token),
            ));
        }
        Ok(expr)
    }

    pub fn matches(&self, note: &NoteView<'_>) -> bool {
        match self {
            PatternExpr::Term(term) => term.matches(note),
            PatternExpr::Not(inner) => !inner.matches(note),
            PatternExpr::And(a, b) => a.matches(note) && b.matches(note),
            PatternExpr::Or(a, b) => a.matches(note) || b.matches(note),
        }
    }

    /// True when any term looks past the path
    pub fn needs_content(&self) -> bool {
        match self {
            PatternExpr::Term(term) => term.needs_content(),
            PatternExpr::Not(inner) => inner.needs_content(),
            PatternExpr::And(a, b) | PatternExpr::Or(a, b) => {
                a.needs_content() || b.needs_content()
            }
        }
    }

    fn is_negated(&self) -> bool {
        match self {
            PatternExpr::Term(_) => false,
            PatternExpr::Not(_) => true,
            PatternExpr::And(a, b) | PatternExpr::Or(a, b) => a.is_negated() || b.is_negated(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    And,
    Or,
    Not,
    Term(String),
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Open => write!(f, "'('"),
            Token::Close => write!(f, "')'"),
            Token::And => write!(f, "AND"),
            Token::Or => write!(f, "OR"),
            Token::Not => write!(f, "NOT"),
            Token::Term(term) => write!(f, "'{}'", term),
        }
    }
}

/// Split on whitespace outside double quotes, peeling parentheses off word ends
fn tokenize(input: &str) -> Vec<Token> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in input.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            c if c.is_whitespace() && !quoted => {
                if !current.is_empty() {
                    words.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        words.push(current);
    }

    let mut tokens = Vec::new();
    for word in &words {
        let mut body = word.as_str();
        while let Some(rest) = body.strip_prefix('(') {
            tokens.push(Token::Open);
            body = rest;
        }
        let mut closing = 0;
        while let Some(rest) = body.strip_suffix(')') {
            closing += 1;
            body = rest;
        }
        if !body.is_empty() {
            tokens.push(match body.to_lowercase().as_str() {
                "and" | "&&" => Token::And,
                "or" | "||" => Token::Or,
                "not" | "!" => Token::Not,
                _ => Token::Term(body.to_string()),
            });
        }
        tokens.extend(std::iter::repeat_n(Token::Close, closing));
    }
    tokens
}

fn insert_implicit_or(tokens: Vec<Token>) -> Vec<Token> {
    let mut out: Vec<Token> = Vec::with_capacity(tokens.len());
    for token in tokens {
        let ends_operand = matches!(out.last(), Some(Token::Term(_) | Token::Close));
        let starts_operand = matches!(token, Token::Term(_) | Token::Open);
        if ends_operand && starts_operand {
            out.push(Token::Or);
        }
        out.push(token);
    }
    out
}

struct ExprParser<'a> {
    raw: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl ExprParser<'_> {
    fn eat(&mut self, token: &Token) -> bool {
        if self.tokens.get(self.pos) == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or(&mut self) -> Result<PatternExpr> {
        let mut left = self.and()?;
        while self.eat(&Token::Or) {
            let right = self.and()?;
            left = PatternExpr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and(&mut self) -> Result<PatternExpr> {
        let mut left = self.unary()?;
        while self.eat(&Token::And) {
            let right = self.unary()?;
            left = PatternExpr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn unary(&mut self) -> Result<PatternExpr> {
        if self.eat(&Token::Not) {
            return Ok(PatternExpr::Not(Box::new(self.unary()?)));
        }
        self.primary()
    }

    fn primary(&mut self) -> Result<PatternExpr> {
        if self.eat(&Token::Open) {
            let expr = self.or()?;
            if !self.eat(&Token::Close) {
                return Err(Error::invalid_pattern(self.raw, "expected ')'"));
            }
            return Ok(expr);
        }
        match self.tokens.get(self.pos).cloned() {
            Some(Token::Term(term)) => {
                self.pos += 1;
                NotePattern::parse(&term).map(PatternExpr::Term)
            }
            Some(token) => Err(Error::invalid_pattern(
                self.raw,
                format!("unexpected token {}", token),
            )),
            None => Err(Error::invalid_pattern(
                self.raw,
                "unexpected end of expression",
            )),
        }
    }
}

/// An ordered set of patterns; a note is selected when any of them matches
#[derive(Debug, Clone, Default)]
pub struct PatternSet {
    patterns: Vec<PatternExpr>,
}

impl PatternSet {
    /// Compile all patterns, failing on the first invalid one
    pub fn compile<S: AsRef<str>>(raw: &[S]) -> Result<Self> {
        let patterns = raw
            .iter()
            .map(|p| PatternExpr::parse(p.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// True when any pattern matches
    pub fn matches(&self, note: &NoteView<'_>) -> bool {
        self.patterns.iter().any(|p| p.matches(note))
    }

    /// Convenience wrapper over a note entry
    pub fn matches_note(&self, note: &NoteEntry) -> bool {
        self.matches(&NoteView::from(note))
    }

    /// Match a file path against the patterns that need nothing but the path
    pub fn matches_path(&self, path: &str) -> bool {
        let view = NoteView::path(path);
        self.patterns
            .iter()
            .filter(|p| !p.needs_content())
            .any(|p| p.matches(&view))
    }

    /// Whether a whole folder can be skipped without looking inside it
    pub fn prunes_dir(&self, path: &str) -> bool {
        let view = NoteView::path(path);
        self.patterns
            .iter()
            .filter(|p| !p.needs_content() && !p.is_negated())
            .any(|p| p.matches(&view))
    }

    /// Whether any pattern depends on tags or frontmatter
    pub fn needs_content(&self) -> bool {
        self.patterns.iter().any(PatternExpr::needs_content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    fn view<'a>(path: &'a str, tags: &'a [String], fm: Option<&'a Value>) -> NoteView<'a> {
        NoteView {
            path,
            tags,
            frontmatter: fm,
        }
    }

    #[test]
    fn test_tag_pattern_is_case_insensitive() {
        let p = NotePattern::parse("tag:Project").unwrap();
        assert!(p.matches(&view("a.md", &tags(&["project"]), None)));
        assert!(p.matches(&view("a.md", &tags(&["#PROJECT"]), None)));
        assert!(!p.matches(&view("a.md", &tags(&["projects"]), None)));
    }

    #[test]
    fn test_folder_prefix_and_exact_note() {
        let folder = NotePattern::parse("archive/").unwrap();
        assert!(folder.matches(&NoteView::path("archive/old.md")));
        assert!(folder.matches(&NoteView::path("archive/deep/older.md")));
        assert!(!folder.matches(&NoteView::path("archived.md")));

        let note = NotePattern::parse("daily/2024-01-01").unwrap();
        assert!(note.matches(&NoteView::path("daily/2024-01-01.md")));
        assert!(!note.matches(&NoteView::path("daily/2024-01-02.md")));
    }

    #[test]
    fn test_glob_pattern() {
        let p = NotePattern::parse("journal/*.md").unwrap();
        assert!(p.matches(&NoteView::path("journal/today.md")));
        assert!(!p.matches(&NoteView::path("notes/today.md")));

        let p = NotePattern::parse("**/draft-*").unwrap();
        assert!(p.matches(&NoteView::path("a/b/draft-one.md")));
    }

    #[test]
    fn test_property_pattern() {
        let fm = json!({
            "Status": "Draft",
            "owners": ["ana", "[[Bo Chen|Bo]]"],
            "priority": 2,
            "archived": false,
        });
        let status = NotePattern::parse("status:draft").unwrap();
        assert!(matches!(status, NotePattern::Property { .. }));
        assert!(status.matches(&view("x.md", &[], Some(&fm))));
        // a folder named like the pattern is not a property match
        assert!(!status.matches(&NoteView::path("status:draft/x.md")));

        assert!(NotePattern::parse("owners:ana").unwrap().matches(&view("x.md", &[], Some(&fm))));
        assert!(NotePattern::parse("owners:bo chen").unwrap().matches(&view("x.md", &[], Some(&fm))));
        assert!(NotePattern::parse("priority:2").unwrap().matches(&view("x.md", &[], Some(&fm))));
        assert!(NotePattern::parse("archived:false").unwrap().matches(&view("x.md", &[], Some(&fm))));
        assert!(!NotePattern::parse("status:done").unwrap().matches(&view("x.md", &[], Some(&fm))));
    }

    #[test]
    fn test_find_pattern() {
        let p = NotePattern::parse("find:meeting notes").unwrap();
        assert!(p.matches(&NoteView::path("work/Meeting-Notes-2024.md")));
        assert!(!p.matches(&NoteView::path("work/notes-meeting.md")));
        assert!(!p.matches(&NoteView::path("work/premeeting notes.md")));

        let pinned = NotePattern::parse("find:work/plan").unwrap();
        assert!(pinned.matches(&NoteView::path("work/q3-plan.md")));
        assert!(!pinned.matches(&NoteView::path("home/plan.md")));

        let short = NotePattern::parse("find:w/").unwrap();
        assert!(short.matches(&NoteView::path("work/anything.md")));

        let wild = NotePattern::parse("find:2024-*-review").unwrap();
        assert!(wild.matches(&NoteView::path("journal/2024-05-review.md")));
        assert!(!wild.matches(&NoteView::path("journal/2023-05-review.md")));

        let dotted = NotePattern::parse("find:readme.md").unwrap();
        assert!(dotted.matches(&NoteView::path("docs/readme.md")));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(NotePattern::parse("").is_err());
        assert!(NotePattern::parse("tag:").is_err());
        assert!(NotePattern::parse("tag:*").is_err());
        assert!(NotePattern::parse("find:").is_err());
        assert!(NotePattern::parse("find:a/b/c").is_err());
        assert!(NotePattern::parse("status:").is_err());
        assert!(NotePattern::parse(":draft").is_err());
        assert!(matches!(
            NotePattern::parse("notes/[abc"),
            Err(Error::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_boolean_expressions() {
        let fm = json!({"status": "draft"});
        let work = tags(&["work"]);

        let both = PatternExpr::parse("tag:work AND status:draft").unwrap();
        assert!(both.matches(&view("a.md", &work, Some(&fm))));
        assert!(!both.matches(&view("a.md", &work, None)));

        let negated = PatternExpr::parse("projects AND NOT tag:work").unwrap();
        assert!(negated.matches(&view("projects/a.md", &[], None)));
        assert!(!negated.matches(&view("projects/a.md", &work, None)));

        let grouped = PatternExpr::parse("(inbox || tag:work) && ! status:draft").unwrap();
        assert!(grouped.matches(&view("inbox/a.md", &[], None)));
        assert!(!grouped.matches(&view("inbox/a.md", &[], Some(&fm))));
        assert!(!grouped.matches(&view("other/a.md", &[], None)));

        let implicit = PatternExpr::parse("(inbox) (archive)").unwrap();
        assert!(implicit.matches(&NoteView::path("archive/x.md")));

        let quoted = PatternExpr::parse("find:\"weekly sync\" AND tag:work").unwrap();
        assert!(quoted.matches(&view("weekly sync 1.md", &work, None)));
    }

    #[test]
    fn test_malformed_expressions() {
        assert!(PatternExpr::parse("(tag:a AND tag:b").is_err());
        assert!(PatternExpr::parse("tag:a AND").is_err());
        assert!(PatternExpr::parse("AND tag:a").is_err());
        assert!(PatternExpr::parse("tag:a NOT tag:b").is_err());
    }

    #[test]
    fn test_plain_path_with_spaces_is_one_term() {
        let expr = PatternExpr::parse("My Notes/old stuff").unwrap();
        assert!(expr.matches(&NoteView::path("My Notes/old stuff/a.md")));
    }

    #[test]
    fn test_pattern_set() {
        let set = PatternSet::compile(&["tag:skip", "templates"]).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.needs_content());
        assert!(set.matches_path("templates/t.md"));
        assert!(!set.matches_path("x.md"));
        assert!(set.matches(&view("x.md", &tags(&["skip"]), None)));
        assert!(!set.matches(&NoteView::path("x.md")));
        assert!(PatternSet::default().is_empty());
    }

    #[test]
    fn test_negated_patterns_never_prune_folders() {
        let set = PatternSet::compile(&["NOT daily/keep"]).unwrap();
        assert!(!set.prunes_dir("daily"));
        assert!(set.matches_path("daily/other.md"));
        assert!(!set.matches_path("daily/keep.md"));
    }
}
