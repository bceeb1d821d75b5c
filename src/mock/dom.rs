use super::*;

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) parent: Option<MockNode>,
    pub(crate) children: Vec<MockNode>,
    pub(crate) node_type: NodeType,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
}

impl Element {
    pub(crate) fn has_class(&self, class_name: &str) -> bool {
        self.attrs
            .get("class")
            .is_some_and(|classes| classes.split_whitespace().any(|c| c == class_name))
    }

    fn class_tokens(&self) -> Vec<String> {
        self.attrs
            .get("class")
            .map(|value| value.split_whitespace().map(ToOwned::to_owned).collect())
            .unwrap_or_default()
    }

    fn set_class_tokens(&mut self, classes: &[String]) {
        if classes.is_empty() {
            self.attrs.remove("class");
        } else {
            self.attrs.insert("class".to_string(), classes.join(" "));
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Dom {
    pub(crate) nodes: Vec<Node>,
    pub(crate) root: MockNode,
    pub(crate) id_index: HashMap<String, Vec<MockNode>>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: MockNode(0),
            id_index: HashMap::new(),
        }
    }

    fn create_node(&mut self, parent: MockNode, node_type: NodeType) -> MockNode {
        let id = MockNode(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            node_type,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub(crate) fn create_element(
        &mut self,
        parent: MockNode,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> MockNode {
        let id_attr = attrs.get("id").cloned();
        let id = self.create_node(parent, NodeType::Element(Element { tag_name, attrs }));
        if let Some(id_attr) = id_attr {
            self.id_index.entry(id_attr).or_default().push(id);
        }
        id
    }

    pub(crate) fn create_text(&mut self, parent: MockNode, text: String) -> MockNode {
        self.create_node(parent, NodeType::Text(text))
    }

    fn node(&self, node_id: MockNode) -> Option<&Node> {
        self.nodes.get(node_id.0)
    }

    pub(crate) fn element(&self, node_id: MockNode) -> Option<&Element> {
        match &self.node(node_id)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: MockNode) -> Option<&mut Element> {
        match &mut self.nodes.get_mut(node_id.0)?.node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: MockNode) -> Option<&str> {
        self.element(node_id).map(|e| e.tag_name.as_str())
    }

    pub(crate) fn parent(&self, node_id: MockNode) -> Option<MockNode> {
        self.node(node_id)?.parent
    }

    pub(crate) fn attr(&self, node_id: MockNode, name: &str) -> Option<String> {
        self.element(node_id)?.attrs.get(name).cloned()
    }

    pub(crate) fn is_connected(&self, node_id: MockNode) -> bool {
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if current == self.root {
                return true;
            }
            cursor = self.parent(current);
        }
        false
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<MockNode> {
        self.id_index
            .get(id)?
            .iter()
            .copied()
            .find(|node| self.is_connected(*node))
    }

    pub(crate) fn class_contains(&self, node_id: MockNode, class_name: &str) -> bool {
        self.element(node_id)
            .is_some_and(|element| element.has_class(class_name))
    }

    pub(crate) fn class_add(&mut self, node_id: MockNode, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Host("classList target is not an element".into()))?;
        let mut classes = element.class_tokens();
        if !classes.iter().any(|name| name == class_name) {
            classes.push(class_name.to_string());
        }
        element.set_class_tokens(&classes);
        Ok(())
    }

    pub(crate) fn class_remove(&mut self, node_id: MockNode, class_name: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::Host("classList target is not an element".into()))?;
        let mut classes = element.class_tokens();
        classes.retain(|name| name != class_name);
        element.set_class_tokens(&classes);
        Ok(())
    }

    /// Detaches `node_id` from its parent. The subtree stays addressable.
    pub(crate) fn remove_node(&mut self, node_id: MockNode) -> Result<()> {
        if node_id == self.root {
            return Err(Error::Host("cannot remove the document".into()));
        }
        let parent = self
            .parent(node_id)
            .ok_or_else(|| Error::Host("node is not attached".into()))?;
        self.nodes[parent.0].children.retain(|child| *child != node_id);
        self.nodes[node_id.0].parent = None;
        Ok(())
    }

    pub(crate) fn collect_elements_dfs(&self, node_id: MockNode, out: &mut Vec<MockNode>) {
        let Some(node) = self.node(node_id) else {
            return;
        };
        for child in &node.children {
            if self.element(*child).is_some() {
                out.push(*child);
            }
            self.collect_elements_dfs(*child, out);
        }
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<MockNode>> {
        let list = SelectorList::parse(selector)?;
        if let Some(id) = list.single_id() {
            return Ok(self.by_id(id).into_iter().collect());
        }

        let mut candidates = Vec::new();
        self.collect_elements_dfs(self.root, &mut candidates);
        Ok(candidates
            .into_iter()
            .filter(|candidate| self.matches_list(*candidate, &list))
            .collect())
    }

    pub(crate) fn matches_selector(&self, node_id: MockNode, selector: &str) -> Result<bool> {
        let list = SelectorList::parse(selector)?;
        Ok(self.matches_list(node_id, &list))
    }

    fn matches_list(&self, node_id: MockNode, list: &SelectorList) -> bool {
        self.element(node_id).is_some()
            && list
                .chains
                .iter()
                .any(|chain| self.matches_chain(node_id, chain))
    }

    fn matches_chain(&self, node_id: MockNode, chain: &[ChainPart]) -> bool {
        let Some((last, rest)) = chain.split_last() else {
            return false;
        };
        if !self.matches_compound(node_id, &last.compound) {
            return false;
        }
        if rest.is_empty() {
            return true;
        }

        let combinator = last.combinator.unwrap_or(Combinator::Descendant);
        let mut cursor = self.parent(node_id);
        while let Some(ancestor) = cursor {
            if self.matches_chain(ancestor, rest) {
                return true;
            }
            if combinator == Combinator::Child {
                return false;
            }
            cursor = self.parent(ancestor);
        }
        false
    }

    fn matches_compound(&self, node_id: MockNode, compound: &Compound) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        if let Some(tag) = &compound.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &compound.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }
        if !compound
            .classes
            .iter()
            .all(|class_name| element.has_class(class_name))
        {
            return false;
        }
        compound
            .attrs
            .iter()
            .all(|attr| attr.matches(element.attrs.get(&attr.name).map(String::as_str)))
    }

    pub(crate) fn closest(&self, node_id: MockNode, selector: &str) -> Result<Option<MockNode>> {
        let list = SelectorList::parse(selector)?;
        let mut cursor = Some(node_id);
        while let Some(current) = cursor {
            if self.matches_list(current, &list) {
                return Ok(Some(current));
            }
            cursor = self.parent(current);
        }
        Ok(None)
    }

    pub(crate) fn text_content(&self, node_id: MockNode) -> String {
        let mut out = String::new();
        self.push_text(node_id, &mut out);
        out
    }

    fn push_text(&self, node_id: MockNode, out: &mut String) {
        let Some(node) = self.node(node_id) else {
            return;
        };
        match &node.node_type {
            NodeType::Text(text) => out.push_str(text),
            _ => {
                for child in &node.children {
                    self.push_text(*child, out);
                }
            }
        }
    }

    pub(crate) fn dump_node(&self, node_id: MockNode) -> String {
        let mut out = String::new();
        self.serialize(node_id, &mut out);
        out
    }

    fn serialize(&self, node_id: MockNode, out: &mut String) {
        let Some(node) = self.node(node_id) else {
            return;
        };
        match &node.node_type {
            NodeType::Document => {
                for child in &node.children {
                    self.serialize(*child, out);
                }
            }
            NodeType::Text(text) => out.push_str(&html::escape_text(text)),
            NodeType::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                let mut attrs = element.attrs.iter().collect::<Vec<_>>();
                attrs.sort_by(|a, b| a.0.cmp(b.0));
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&html::escape_attr(value));
                    out.push('"');
                }
                out.push('>');
                if html::is_void_tag(&element.tag_name) {
                    return;
                }
                for child in &node.children {
                    self.serialize(*child, out);
                }
                out.push_str("</");
                out.push_str(&element.tag_name);
                out.push('>');
            }
        }
    }

    /// Short label for trace lines: `#id`, else `tag.class`, else `tag`.
    pub(crate) fn node_label(&self, node_id: MockNode) -> String {
        if node_id == self.root {
            return "document".to_string();
        }
        let Some(element) = self.element(node_id) else {
            return format!("node{}", node_id.0);
        };
        if let Some(id) = element.attrs.get("id") {
            return format!("#{id}");
        }
        match element.class_tokens().first() {
            Some(class_name) => format!("{}.{class_name}", element.tag_name),
            None => element.tag_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dom(html: &str) -> Dom {
        match html::parse_html(html) {
            Ok(dom) => dom,
            Err(err) => panic!("fixture failed to parse: {err}"),
        }
    }

    #[test]
    fn class_add_and_remove_keep_tokens_unique() -> Result<()> {
        let mut dom = dom("<div id='box' class='alert alert-info'></div>");
        let node = dom.by_id("box").ok_or_else(|| Error::SelectorNotFound("#box".into()))?;
        dom.class_add(node, "d-none")?;
        dom.class_add(node, "d-none")?;
        assert_eq!(dom.attr(node, "class").as_deref(), Some("alert alert-info d-none"));
        dom.class_remove(node, "alert-info")?;
        assert_eq!(dom.attr(node, "class").as_deref(), Some("alert d-none"));
        dom.class_remove(node, "alert")?;
        dom.class_remove(node, "d-none")?;
        assert_eq!(dom.attr(node, "class"), None);
        Ok(())
    }

    #[test]
    fn query_matches_descendant_and_child_chains() -> Result<()> {
        let dom = dom(
            "<main><ul class='menu'><li><a id='a1' href='/x'>x</a></li></ul><a id='a2'>y</a></main>",
        );
        let labels = |nodes: Vec<MockNode>| {
            nodes
                .into_iter()
                .map(|node| dom.node_label(node))
                .collect::<Vec<_>>()
        };
        assert_eq!(labels(dom.query_selector_all("main a")?), vec!["#a1", "#a2"]);
        assert_eq!(labels(dom.query_selector_all("main > a")?), vec!["#a2"]);
        assert_eq!(labels(dom.query_selector_all(".menu a[href]")?), vec!["#a1"]);
        assert_eq!(labels(dom.query_selector_all("li > a, #a2")?), vec!["#a1", "#a2"]);
        Ok(())
    }

    #[test]
    fn removed_nodes_leave_queries_and_id_lookup() -> Result<()> {
        let mut dom = dom("<div class='alert' id='a'><b>hi</b></div>");
        let node = dom.by_id("a").ok_or_else(|| Error::SelectorNotFound("#a".into()))?;
        dom.remove_node(node)?;
        assert!(!dom.is_connected(node));
        assert_eq!(dom.by_id("a"), None);
        assert!(dom.query_selector_all(".alert")?.is_empty());
        assert!(dom.matches_selector(node, ".alert")?);
        assert!(matches!(dom.remove_node(node), Err(Error::Host(_))));
        Ok(())
    }

    #[test]
    fn closest_walks_up_from_the_node_itself() -> Result<()> {
        let dom = dom("<form id='f'><button id='b'><span id='s'>x</span></button></form>");
        let span = dom.by_id("s").ok_or_else(|| Error::SelectorNotFound("#s".into()))?;
        assert_eq!(
            dom.closest(span, "button")?.map(|n| dom.node_label(n)),
            Some("#b".to_string())
        );
        assert_eq!(
            dom.closest(span, "form")?.map(|n| dom.node_label(n)),
            Some("#f".to_string())
        );
        assert_eq!(dom.closest(span, "a")?, None);
        Ok(())
    }

    #[test]
    fn dump_node_sorts_attributes() {
        let dom = dom("<p data-b='2' class='x' data-a='1'>a &amp; b<br></p>");
        assert_eq!(
            dom.dump_node(dom.root),
            "<p class=\"x\" data-a=\"1\" data-b=\"2\">a &amp; b<br></p>"
        );
    }
}
