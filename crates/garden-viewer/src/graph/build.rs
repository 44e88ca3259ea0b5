use garden_core::{GardenIndex, Link, LinkKind, Node, NodeId, NodeMeta};

/// Turn an index snapshot into nodes and links, ready for `replace_all`.
///
/// Related links may point at notes that do not exist; the model drops
/// those when the snapshot is applied.
pub fn build_graph(index: &GardenIndex) -> (Vec<Node>, Vec<Link>) {
    let mut nodes = Vec::new();
    let mut links = Vec::new();

    for (title, note) in &index.notes {
        nodes.push(Node::note(title).with_meta(NodeMeta {
            tags: note.tags.clone(),
            created: note.created.clone(),
            source_path: note.path.clone(),
            related_notes: note.related_notes.clone(),
            ..NodeMeta::default()
        }));
        for related in &note.related_notes {
            links.push(Link::new(
                NodeId::note(title),
                NodeId::note(related),
                LinkKind::Related,
            ));
        }
    }

    for (tag, tagged) in &index.tags {
        nodes.push(Node::tag(tag));
        for note in tagged {
            links.push(Link::new(NodeId::tag(tag), NodeId::note(note), LinkKind::Tagged));
        }
    }

    if let Some(paths) = &index.paths {
        for (topic, entry) in paths {
            nodes.push(Node::path(topic).with_meta(NodeMeta {
                subtopics: entry.subtopics.clone(),
                ..NodeMeta::default()
            }));

            let needle = topic.to_lowercase();
            for (title, note) in &index.notes {
                if note.tags.iter().any(|t| *t == needle) || title.to_lowercase().contains(&needle) {
                    links.push(Link::new(
                        NodeId::path(topic),
                        NodeId::note(title),
                        LinkKind::PathMembership,
                    ));
                }
            }
        }
    }

    (nodes, links)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::model::GraphModel;
    use garden_core::{NodeKind, NoteEntry, PathEntry};
    use std::collections::BTreeMap;

    fn note(tags: &[&str], related: &[&str]) -> NoteEntry {
        NoteEntry {
            path: Some("notes/x.md".into()),
            tags: tags.iter().map(|s| s.to_string()).collect(),
            created: Some("2024-01-01T00:00:00".into()),
            related_notes: related.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn sample_index() -> GardenIndex {
        let mut notes = BTreeMap::new();
        notes.insert("Memory Safety".to_string(), note(&["rust"], &["Ownership"]));
        notes.insert("Ownership".to_string(), note(&[], &["Memory Safety", "Ghost"]));
        notes.insert("Gardening".to_string(), note(&[], &[]));

        let mut tags = BTreeMap::new();
        tags.insert("rust".to_string(), vec!["Memory Safety".to_string()]);

        let mut paths = BTreeMap::new();
        paths.insert(
            "Rust".to_string(),
            PathEntry {
                subtopics: vec!["borrowing".into()],
            },
        );

        GardenIndex {
            notes,
            tags,
            paths: Some(paths),
            ..GardenIndex::default()
        }
    }

    #[test]
    fn builds_namespaced_nodes() {
        let (nodes, _) = build_graph(&sample_index());
        let kinds: Vec<(String, NodeKind)> =
            nodes.iter().map(|n| (n.id.0.clone(), n.kind)).collect();
        assert!(kinds.contains(&("Ownership".into(), NodeKind::Note)));
        assert!(kinds.contains(&("tag:rust".into(), NodeKind::Tag)));
        assert!(kinds.contains(&("path:Rust".into(), NodeKind::Path)));
        let path_node = nodes.iter().find(|n| n.kind == NodeKind::Path).unwrap();
        assert_eq!(path_node.meta.subtopics, vec!["borrowing".to_string()]);
    }

    #[test]
    fn path_membership_matches_tags_and_titles() {
        let (_, links) = build_graph(&sample_index());
        let members: Vec<&str> = links
            .iter()
            .filter(|l| l.kind == LinkKind::PathMembership)
            .map(|l| l.target.as_str())
            .collect();
        assert_eq!(members, vec!["Memory Safety"]);
    }

    #[test]
    fn applying_snapshot_drops_dangling_and_mirrored_links() {
        let (nodes, links) = build_graph(&sample_index());
        let mut m = GraphModel::default();
        m.replace_all(nodes, links);

        // Memory Safety<->Ownership appears twice in the index, Ghost does not exist.
        let related = m
            .links()
            .iter()
            .filter(|l| l.kind == LinkKind::Related)
            .count();
        assert_eq!(related, 1);
        assert_eq!(m.stats().notes, 3);
        assert!(!m.contains(&"Ghost".into()));
    }
}
