use petgraph::dot::{Config, Dot};

use super::{SchemaGraph, Vertex, VertexKind};

impl SchemaGraph {
    /// Use https://dreampuf.github.io/GraphvizOnline
    /// or `echo '..." | dot -Tsvg` from graphviz
    pub fn to_dot_graph(&self) -> String {
        format!(
            "{:?}",
            Dot::with_attr_getters(
                &self.graph,
                &[Config::EdgeNoLabel, Config::NodeNoLabel],
                &|_, edge| format!("label = \"{}\"", escape(edge.weight())),
                &|_, (_, vertex)| vertex_attributes(vertex),
            )
        )
    }
}

fn vertex_attributes(vertex: &Vertex) -> String {
    let style = match vertex.kind() {
        VertexKind::Object | VertexKind::Interface | VertexKind::InputObject => "shape=box",
        VertexKind::Union | VertexKind::Enum => "shape=box,style=rounded",
        VertexKind::Scalar if vertex.is_built_in_scalar() => "shape=box,style=dashed",
        VertexKind::Scalar => "shape=box",
        VertexKind::Directive => "shape=parallelogram,color=royalblue",
        VertexKind::AppliedDirective => "shape=ellipse,color=royalblue",
        VertexKind::Field | VertexKind::InputField | VertexKind::Argument | VertexKind::EnumValue => "shape=ellipse",
    };

    format!("label = \"{} {}\",{style}", vertex.kind(), escape(vertex.path()))
}

fn escape(text: &str) -> String {
    text.replace('"', "\\\"")
}
