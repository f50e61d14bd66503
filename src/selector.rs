use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
    StartsWith { key: String, prefix: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Combinator {
    Descendant,
    Child,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct Step {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

impl Step {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }

    fn id_only(&self) -> Option<&str> {
        if !self.universal && self.tag.is_none() && self.classes.is_empty() && self.attrs.is_empty()
        {
            self.id.as_deref()
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Part {
    pub(crate) step: Step,
    // Relation to the previous (left) part.
    pub(crate) combinator: Option<Combinator>,
}

pub(crate) fn parse_groups(selector: &str) -> Result<Vec<Vec<Part>>> {
    let mut parsed = Vec::new();
    for group in split_groups(selector)? {
        parsed.push(parse_chain(selector, &group)?);
    }
    Ok(parsed)
}

fn split_groups(selector: &str) -> Result<Vec<String>> {
    let mut groups = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in selector.chars() {
        match ch {
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
                groups.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    groups.push(current);

    if bracket_depth != 0 {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let groups: Vec<String> = groups.into_iter().map(|g| g.trim().to_string()).collect();
    if groups.iter().any(String::is_empty) {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(groups)
}

fn parse_chain(original: &str, group: &str) -> Result<Vec<Part>> {
    let tokens = tokenize(original, group)?;
    let mut parts = Vec::new();
    let mut pending: Option<Combinator> = None;

    for token in tokens {
        if token == ">" {
            if pending.is_some() || parts.is_empty() {
                return Err(Error::UnsupportedSelector(original.into()));
            }
            pending = Some(Combinator::Child);
            continue;
        }
        if token == "+" || token == "~" {
            return Err(Error::UnsupportedSelector(original.into()));
        }

        let step = parse_step(original, &token)?;
        let combinator = if parts.is_empty() {
            None
        } else {
            Some(pending.take().unwrap_or(Combinator::Descendant))
        };
        parts.push(Part { step, combinator });
    }

    if parts.is_empty() || pending.is_some() {
        return Err(Error::UnsupportedSelector(original.into()));
    }
    Ok(parts)
}

fn tokenize(original: &str, group: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut bracket_depth = 0usize;

    for ch in group.chars() {
        match ch {
            '[' => {
                bracket_depth += 1;
                current.push(ch);
            }
            ']' => {
                if bracket_depth == 0 {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                bracket_depth -= 1;
                current.push(ch);
            }
            c if c.is_whitespace() && bracket_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            '>' | '+' | '~' if bracket_depth == 0 => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            _ => current.push(ch),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    Ok(tokens)
}

fn parse_step(original: &str, token: &str) -> Result<Step> {
    let mut step = Step::default();
    let mut chars = token.chars().peekable();

    while let Some(&ch) = chars.peek() {
        match ch {
            '*' => {
                chars.next();
                step.universal = true;
            }
            '#' => {
                chars.next();
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                step.id = Some(name);
            }
            '.' => {
                chars.next();
                let name = take_name(&mut chars);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                step.classes.push(name);
            }
            '[' => {
                chars.next();
                let mut inner = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == ']' {
                        closed = true;
                        break;
                    }
                    inner.push(c);
                }
                if !closed {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                step.attrs.push(parse_attr_condition(original, &inner)?);
            }
            ':' => {
                return Err(Error::UnsupportedSelector(original.into()));
            }
            _ => {
                let name = take_name(&mut chars);
                if name.is_empty() || step.tag.is_some() {
                    return Err(Error::UnsupportedSelector(original.into()));
                }
                step.tag = Some(name.to_ascii_lowercase());
            }
        }
    }

    if step.is_empty() {
        return Err(Error::UnsupportedSelector(original.into()));
    }
    Ok(step)
}

fn take_name(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_alphanumeric() || c == '-' || c == '_' {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    out
}

fn parse_attr_condition(original: &str, inner: &str) -> Result<AttrCondition> {
    let inner = inner.trim();
    if inner.is_empty() {
        return Err(Error::UnsupportedSelector(original.into()));
    }

    let (key, op_value) = match inner.find(['^', '=']) {
        None => {
            return Ok(AttrCondition::Exists {
                key: inner.to_ascii_lowercase(),
            });
        }
        Some(pos) => (inner[..pos].trim(), &inner[pos..]),
    };

    if key.is_empty() {
        return Err(Error::UnsupportedSelector(original.into()));
    }
    let key = key.to_ascii_lowercase();

    if let Some(rest) = op_value.strip_prefix("^=") {
        return Ok(AttrCondition::StartsWith {
            key,
            prefix: unquote(rest.trim()).to_string(),
        });
    }
    if let Some(rest) = op_value.strip_prefix('=') {
        return Ok(AttrCondition::Eq {
            key,
            value: unquote(rest.trim()).to_string(),
        });
    }
    Err(Error::UnsupportedSelector(original.into()))
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2
        && (bytes[0] == b'"' || bytes[0] == b'\'')
        && bytes[bytes.len() - 1] == bytes[0]
    {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

impl Dom {
    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        let all = self.query_selector_all(selector)?;
        Ok(all.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        let groups = parse_groups(selector)?;

        if groups.len() == 1 && groups[0].len() == 1 {
            if let Some(id) = groups[0][0].step.id_only() {
                return Ok(self.by_id(id).into_iter().collect());
            }
        }

        let mut ids = Vec::new();
        self.collect_elements_dfs(self.root, &mut ids);

        let mut matched = Vec::new();
        for candidate in ids {
            if groups
                .iter()
                .any(|parts| self.matches_chain(candidate, parts))
            {
                matched.push(candidate);
            }
        }
        Ok(matched)
    }

    pub(crate) fn query_selector_from(
        &self,
        root: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        let groups = parse_groups(selector)?;

        let mut ids = Vec::new();
        self.collect_element_descendants_dfs(root, &mut ids);

        Ok(ids.into_iter().find(|candidate| {
            groups
                .iter()
                .any(|parts| self.matches_chain(*candidate, parts))
        }))
    }

    pub(crate) fn matches_selector(&self, node_id: NodeId, selector: &str) -> Result<bool> {
        if self.element(node_id).is_none() {
            return Ok(false);
        }
        let groups = parse_groups(selector)?;
        Ok(groups.iter().any(|parts| self.matches_chain(node_id, parts)))
    }

    pub(crate) fn closest(&self, node_id: NodeId, selector: &str) -> Result<Option<NodeId>> {
        if self.element(node_id).is_none() {
            return Ok(None);
        }
        let groups = parse_groups(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.element(current).is_some()
                && groups.iter().any(|parts| self.matches_chain(current, parts))
            {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    fn matches_chain(&self, node_id: NodeId, parts: &[Part]) -> bool {
        let Some((last, rest)) = parts.split_last() else {
            return false;
        };
        if !self.matches_step(node_id, &last.step) {
            return false;
        }
        self.matches_prefix(node_id, rest, last.combinator)
    }

    // Walks ancestors right-to-left; a descendant hop that matched too early
    // retries further up instead of sinking the chain.
    fn matches_prefix(
        &self,
        node_id: NodeId,
        parts: &[Part],
        combinator: Option<Combinator>,
    ) -> bool {
        let Some((part, rest)) = parts.split_last() else {
            return true;
        };

        match combinator.unwrap_or(Combinator::Descendant) {
            Combinator::Child => {
                let Some(parent) = self.parent(node_id) else {
                    return false;
                };
                self.matches_step(parent, &part.step)
                    && self.matches_prefix(parent, rest, part.combinator)
            }
            Combinator::Descendant => {
                let mut cursor = self.parent(node_id);
                while let Some(parent) = cursor {
                    if self.matches_step(parent, &part.step)
                        && self.matches_prefix(parent, rest, part.combinator)
                    {
                        return true;
                    }
                    cursor = self.parent(parent);
                }
                false
            }
        }
    }

    fn matches_step(&self, node_id: NodeId, step: &Step) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };

        if let Some(tag) = &step.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &step.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }

        for class in &step.classes {
            if !crate::dom::has_class(element, class) {
                return false;
            }
        }

        for condition in &step.attrs {
            let ok = match condition {
                AttrCondition::Exists { key } => element.attrs.contains_key(key),
                AttrCondition::Eq { key, value } => {
                    element.attrs.get(key).map(String::as_str) == Some(value.as_str())
                }
                AttrCondition::StartsWith { key, prefix } => element
                    .attrs
                    .get(key)
                    .map(|v| v.starts_with(prefix.as_str()))
                    .unwrap_or(false),
            };
            if !ok {
                return false;
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    const FIXTURE: &str = r#"
        <nav class='navbar'>
          <div class='nav-dropdown'>
            <a class='dropdown-toggle' href='#tools'>Tools</a>
          </div>
        </nav>
        <main>
          <div class='feature-card highlight'></div>
          <div class='action-card'></div>
          <a id='top-link' href='#top'>top</a>
          <a id='ext-link' href='https://example.com/#frag'>ext</a>
          <form class='tool-form'>
            <button type='submit'>Go</button>
            <button type='button'>Other</button>
          </form>
        </main>
        "#;

    #[test]
    fn class_and_group_selectors_match() -> Result<()> {
        let dom = parse_html(FIXTURE)?;
        let cards = dom.query_selector_all(".feature-card, .action-card, .result-card")?;
        assert_eq!(cards.len(), 2);
        Ok(())
    }

    #[test]
    fn attr_prefix_selects_fragment_anchors_only() -> Result<()> {
        let dom = parse_html(FIXTURE)?;
        let anchors = dom.query_selector_all(r##"a[href^="#"]"##)?;
        assert_eq!(anchors.len(), 2);
        assert!(anchors.contains(&dom.by_id("top-link").unwrap()));
        assert!(!anchors.contains(&dom.by_id("ext-link").unwrap()));
        Ok(())
    }

    #[test]
    fn attr_eq_narrows_by_type() -> Result<()> {
        let dom = parse_html(FIXTURE)?;
        let buttons = dom.query_selector_all(r#"button[type="submit"]"#)?;
        assert_eq!(buttons.len(), 1);
        Ok(())
    }

    #[test]
    fn descendant_and_child_combinators() -> Result<()> {
        let dom = parse_html(FIXTURE)?;
        assert_eq!(dom.query_selector_all(".navbar .dropdown-toggle")?.len(), 1);
        assert_eq!(dom.query_selector_all(".navbar > .nav-dropdown")?.len(), 1);
        assert_eq!(
            dom.query_selector_all(".navbar > .dropdown-toggle")?.len(),
            0
        );
        Ok(())
    }

    #[test]
    fn closest_walks_to_the_dropdown_container() -> Result<()> {
        let dom = parse_html(FIXTURE)?;
        let toggle = dom.query_selector(".dropdown-toggle")?.unwrap();
        let container = dom.closest(toggle, ".nav-dropdown")?;
        assert!(container.is_some());
        assert!(dom.matches_selector(container.unwrap(), ".nav-dropdown")?);
        Ok(())
    }

    #[test]
    fn pseudo_classes_are_unsupported() {
        let dom = parse_html("<p>x</p>").unwrap();
        let err = dom
            .query_selector_all("p:first-child")
            .expect_err("pseudo-class should be rejected");
        assert!(matches!(err, Error::UnsupportedSelector(_)));
    }
}
