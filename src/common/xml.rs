use roxmltree::Node;

/// The XML Schema namespace. Every recognized XSD construct lives here.
pub const XSD_NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema";

/// Whether a node is the XSD element with the given local name.
pub fn is_xsd(node: Node, local: &str) -> bool {
    node.tag_name().namespace() == Some(XSD_NAMESPACE) && node.tag_name().name() == local
}

/// Element children in document order.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|c| c.is_element())
}

/// XSD element children with the given local name, in document order.
pub fn xsd_children<'a, 'input>(
    node: Node<'a, 'input>,
    local: &'static str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    element_children(node).filter(move |c| is_xsd(*c, local))
}

pub fn first_xsd_child<'a, 'input>(
    node: Node<'a, 'input>,
    local: &'static str,
) -> Option<Node<'a, 'input>> {
    xsd_children(node, local).next()
}

/// Concatenated direct text content of an element. Text interleaved with
/// child elements is included; markup is not.
pub fn text_content(node: Node) -> String {
    node.children()
        .filter(|c| c.is_text())
        .filter_map(|c| c.text())
        .collect()
}

/// `minOccurs` of a particle, defaulting to 1.
pub fn min_occurs(node: Node) -> u32 {
    node.attribute("minOccurs")
        .and_then(|v| v.parse().ok())
        .unwrap_or(1)
}

/// `maxOccurs` of a particle, defaulting to 1. `unbounded` maps to
/// `u32::MAX`.
pub fn max_occurs(node: Node) -> u32 {
    match node.attribute("maxOccurs") {
        Some("unbounded") => u32::MAX,
        Some(v) => v.parse().unwrap_or(1),
        None => 1,
    }
}

/// Split a QName lexical value into its prefix and local parts.
pub fn split_qname(value: &str) -> (Option<&str>, &str) {
    match value.split_once(':') {
        Some((prefix, local)) => (Some(prefix), local),
        None => (None, value),
    }
}

/// Whether a QName prefix is bound to the XSD namespace at this node.
pub fn prefix_is_xsd(node: Node, prefix: Option<&str>) -> bool {
    node.lookup_namespace_uri(prefix) == Some(XSD_NAMESPACE)
}
