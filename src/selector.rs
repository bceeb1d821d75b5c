use super::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum AttrOp {
    Exists,
    Eq,
    StartsWith,
    EndsWith,
    Contains,
    Includes,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct AttrMatch {
    pub(crate) name: String,
    pub(crate) op: AttrOp,
    pub(crate) value: String,
}

impl AttrMatch {
    pub(crate) fn matches(&self, actual: Option<&str>) -> bool {
        let Some(actual) = actual else {
            return false;
        };
        match self.op {
            AttrOp::Exists => true,
            AttrOp::Eq => actual == self.value,
            AttrOp::StartsWith => !self.value.is_empty() && actual.starts_with(&self.value),
            AttrOp::EndsWith => !self.value.is_empty() && actual.ends_with(&self.value),
            AttrOp::Contains => !self.value.is_empty() && actual.contains(&self.value),
            AttrOp::Includes => actual.split_whitespace().any(|token| token == self.value),
        }
    }
}

/// One compound selector such as `a.btn[data-confirm]`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Compound {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrMatch>,
}

impl Compound {
    pub(crate) fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }

    fn is_empty(&self) -> bool {
        self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
            && !self.universal
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ChainPart {
    pub(crate) compound: Compound,
    // Relation to the part on the left; `None` for the leftmost part.
    pub(crate) combinator: Option<Combinator>,
}

/// A parsed selector list: `a, b > c` is two chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct SelectorList {
    pub(crate) chains: Vec<Vec<ChainPart>>,
}

impl SelectorList {
    pub(crate) fn parse(selector: &str) -> Result<Self> {
        Ok(Self {
            chains: parse_selector_groups(selector)?,
        })
    }

    pub(crate) fn single_id(&self) -> Option<&str> {
        match self.chains.as_slice() {
            [chain] if chain.len() == 1 => chain[0].compound.id_only(),
            _ => None,
        }
    }
}

pub(crate) fn parse_selector_groups(selector: &str) -> Result<Vec<Vec<ChainPart>>> {
    split_selector_groups(selector)?
        .iter()
        .map(|group| parse_selector_chain(group))
        .collect()
}

pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<ChainPart>> {
    let selector = selector.trim();
    if selector.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut parts: Vec<ChainPart> = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokenize_selector(selector)? {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(Error::UnsupportedSelector(selector.into()));
            }
            pending = Some(Combinator::Child);
            continue;
        }
        if token == "+" || token == "~" {
            return Err(Error::UnsupportedSelector(selector.into()));
        }

        let compound = parse_compound(&token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(ChainPart {
            compound,
            combinator,
        });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(parts)
}

pub(crate) fn split_selector_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut quote: Option<char> = None;

    for ch in selector.chars() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            ',' if bracket_depth == 0 => {
                let trimmed = current.trim();
                if trimmed.is_empty() {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                groups.push(trimmed.to_string());
                current.clear();
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 || quote.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let trimmed = current.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    groups.push(trimmed.to_string());
    Ok(groups)
}

pub(crate) fn tokenize_selector(selector: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;
    let mut quote: Option<char> = None;

    let flush = |current: &mut String, tokens: &mut Vec<String>| {
        let trimmed = current.trim();
        if !trimmed.is_empty() {
            tokens.push(trimmed.to_string());
        }
        current.clear();
    };

    for ch in selector.chars() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            current.push(ch);
            continue;
        }
        match ch {
            '"' | '\'' if bracket_depth > 0 => {
                quote = Some(ch);
                current.push(ch);
            }
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(selector.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            '>' | '+' | '~' if bracket_depth == 0 => {
                flush(&mut current, &mut tokens);
                tokens.push(ch.to_string());
            }
            ch if ch.is_ascii_whitespace() && bracket_depth == 0 => {
                flush(&mut current, &mut tokens);
            }
            _ => current.push(ch),
        }
    }

    if bracket_depth != 0 || quote.is_some() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    flush(&mut current, &mut tokens);
    Ok(tokens)
}

pub(crate) fn parse_compound(part: &str) -> Result<Compound> {
    let part = part.trim();
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut compound = Compound::default();

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                if compound.universal || i != 0 {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                compound.universal = true;
                i += 1;
            }
            b'#' => {
                let Some((id, next)) = parse_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                if compound.id.replace(id).is_some() {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                i = next;
            }
            b'.' => {
                let Some((class_name, next)) = parse_ident(part, i + 1) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                compound.classes.push(class_name);
                i = next;
            }
            b'[' => {
                let (attr, next) = parse_attr_match(part, i)?;
                compound.attrs.push(attr);
                i = next;
            }
            _ => {
                if i != 0 {
                    return Err(Error::UnsupportedSelector(part.into()));
                }
                let Some((tag, next)) = parse_ident(part, i) else {
                    return Err(Error::UnsupportedSelector(part.into()));
                };
                compound.tag = Some(tag.to_ascii_lowercase());
                i = next;
            }
        }
    }

    if compound.is_empty() {
        return Err(Error::UnsupportedSelector(part.into()));
    }
    Ok(compound)
}

fn parse_ident(src: &str, start: usize) -> Option<(String, usize)> {
    let bytes = src.as_bytes();
    if start >= bytes.len() || !is_ident_byte(bytes[start]) {
        return None;
    }
    let mut end = start + 1;
    while end < bytes.len() && is_ident_byte(bytes[end]) {
        end += 1;
    }
    Some((src.get(start..end)?.to_string(), end))
}

fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'-'
}

fn is_attr_name_byte(b: u8) -> bool {
    is_ident_byte(b) || b == b':'
}

fn skip_ws(bytes: &[u8], i: &mut usize) {
    while *i < bytes.len() && bytes[*i].is_ascii_whitespace() {
        *i += 1;
    }
}

fn parse_attr_match(src: &str, open_bracket: usize) -> Result<(AttrMatch, usize)> {
    let unsupported = || Error::UnsupportedSelector(src.into());
    let bytes = src.as_bytes();
    let mut i = open_bracket + 1;

    skip_ws(bytes, &mut i);
    let name_start = i;
    while i < bytes.len() && is_attr_name_byte(bytes[i]) {
        i += 1;
    }
    if name_start == i {
        return Err(unsupported());
    }
    let name = src
        .get(name_start..i)
        .ok_or_else(unsupported)?
        .to_ascii_lowercase();

    skip_ws(bytes, &mut i);
    let (op, next) = match (bytes.get(i), bytes.get(i + 1)) {
        (Some(b']'), _) => {
            let attr = AttrMatch {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            };
            return Ok((attr, i + 1));
        }
        (Some(b'='), _) => (AttrOp::Eq, i + 1),
        (Some(b'^'), Some(b'=')) => (AttrOp::StartsWith, i + 2),
        (Some(b'$'), Some(b'=')) => (AttrOp::EndsWith, i + 2),
        (Some(b'*'), Some(b'=')) => (AttrOp::Contains, i + 2),
        (Some(b'~'), Some(b'=')) => (AttrOp::Includes, i + 2),
        _ => return Err(unsupported()),
    };

    i = next;
    skip_ws(bytes, &mut i);
    let value = match bytes.get(i) {
        Some(&quote) if quote == b'"' || quote == b'\'' => {
            let start = i + 1;
            let close = bytes[start..]
                .iter()
                .position(|b| *b == quote)
                .map(|offset| start + offset)
                .ok_or_else(unsupported)?;
            i = close + 1;
            src.get(start..close).ok_or_else(unsupported)?.to_string()
        }
        Some(_) => {
            let start = i;
            while i < bytes.len() && is_ident_byte(bytes[i]) {
                i += 1;
            }
            if start == i {
                return Err(unsupported());
            }
            src.get(start..i).ok_or_else(unsupported)?.to_string()
        }
        None => return Err(unsupported()),
    };

    skip_ws(bytes, &mut i);
    if bytes.get(i) != Some(&b']') {
        return Err(unsupported());
    }
    Ok((AttrMatch { name, op, value }, i + 1))
}
