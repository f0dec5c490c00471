//! Assembly of the renderer-facing result tree. Single-source results
//! become one inline block; multi-source results become a root container
//! whose children reference per-source datasets in a [`DatasetMap`].

use crate::sampling::Dataset;
use feedchat_protocol::{Block, DatasetMap, RouteResult};

pub const COMPONENT_CONTAINER: &str = "container";
pub const COMPONENT_FEED_LIST: &str = "feed_list";

/// Build the result tree for a resolved data query.
pub fn build_route_panels(
    routes: &[RouteResult],
    confidence: Option<f64>,
) -> (Vec<Block>, DatasetMap) {
    let answered: Vec<&RouteResult> = routes.iter().filter(|route| route.is_success()).collect();

    match answered.as_slice() {
        [] => (Vec::new(), DatasetMap::new()),
        [only] => {
            let mut block = Block::inline(
                format!("feed-{}", slug(&only.path)),
                COMPONENT_FEED_LIST,
                only.records.clone(),
            )
            .title(only.path.clone());
            if let Some(confidence) = confidence {
                block = block.confidence(confidence);
            }
            (vec![block], DatasetMap::new())
        }
        many => {
            let mut datasets = DatasetMap::new();
            let mut root = Block::container("root", COMPONENT_CONTAINER)
                .option_value("sources", serde_json::json!(many.len()));
            if let Some(confidence) = confidence {
                root = root.confidence(confidence);
            }
            for route in many {
                let key = slug(&route.path);
                datasets.insert(key.clone(), route.records.clone());
                root.push_child(
                    Block::reference(format!("feed-{key}"), COMPONENT_FEED_LIST, key.clone())
                        .title(route.path.clone()),
                );
            }
            (vec![root], datasets)
        }
    }
}

/// Build the result tree for an analysis response: one container with a
/// reference child per summarized dataset.
pub fn build_summary_panels(datasets: &[Dataset]) -> (Vec<Block>, DatasetMap) {
    if datasets.is_empty() {
        return (Vec::new(), DatasetMap::new());
    }

    let mut map = DatasetMap::new();
    let mut root = Block::container("analysis", COMPONENT_CONTAINER)
        .option_value("sources", serde_json::json!(datasets.len()));
    for dataset in datasets {
        let key = slug(&dataset.name);
        map.insert(key.clone(), dataset.records.clone());
        root.push_child(
            Block::reference(format!("set-{key}"), COMPONENT_FEED_LIST, key.clone())
                .title(dataset.name.clone()),
        );
    }
    (vec![root], map)
}

/// Stable, id-safe form of a path or dataset name.
fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.ends_with('-') {
            out.push('-');
        }
    }
    let trimmed = out.trim_matches('-');
    if trimmed.is_empty() {
        "source".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use feedchat_protocol::{BlockSource, Origin, Record};
    use pretty_assertions::assert_eq;

    fn route(path: &str, titles: &[&str]) -> RouteResult {
        let records = titles
            .iter()
            .map(|t| Record::new(*t, format!("https://e.com/{t}"), "d"))
            .collect();
        RouteResult::success(path, Origin::Primary, records)
    }

    #[test]
    fn single_source_yields_one_inline_block_and_no_datasets() {
        let routes = vec![route("feeds/rust", &["a", "b"])];
        let (blocks, datasets) = build_route_panels(&routes, Some(0.8));

        assert!(datasets.is_empty());
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, "feed-feeds-rust");
        assert_eq!(blocks[0].confidence, Some(0.8));
        match blocks[0].source() {
            BlockSource::Inline(records) => assert_eq!(records.len(), 2),
            other => panic!("expected inline source, got {other:?}"),
        }
    }

    #[test]
    fn multi_source_yields_container_with_reference_children() {
        let routes = vec![route("feeds/rust", &["a"]), route("feeds/go", &["b", "c"])];
        let (blocks, datasets) = build_route_panels(&routes, None);

        assert_eq!(blocks.len(), 1);
        let root = &blocks[0];
        assert_eq!(root.component, COMPONENT_CONTAINER);
        assert_eq!(root.children.len(), 2);
        assert_eq!(datasets.len(), 2);

        // Every child resolves against the dataset map, in route order.
        let first = root.children[0].resolve(&datasets).unwrap();
        assert_eq!(first[0].title, "a");
        let second = root.children[1].resolve(&datasets).unwrap();
        assert_eq!(second.len(), 2);
        assert_eq!(root.children[0].title.as_deref(), Some("feeds/rust"));
    }

    #[test]
    fn failed_routes_are_left_out_of_the_tree() {
        let routes = vec![
            route("feeds/rust", &["a"]),
            RouteResult::failure("feeds/down", Origin::Primary, "boom"),
        ];
        let (blocks, datasets) = build_route_panels(&routes, None);

        // Only one source answered, so the tree collapses to an inline block.
        assert_eq!(blocks.len(), 1);
        assert!(datasets.is_empty());
        assert!(matches!(blocks[0].source(), BlockSource::Inline(_)));
    }

    #[test]
    fn no_successful_routes_yield_an_empty_tree() {
        let routes = vec![RouteResult::failure("feeds/down", Origin::Primary, "boom")];
        let (blocks, datasets) = build_route_panels(&routes, None);
        assert!(blocks.is_empty());
        assert!(datasets.is_empty());
    }

    #[test]
    fn summary_panels_reference_every_dataset() {
        let datasets = vec![
            Dataset::new("Tech News", vec![Record::new("a", "l", "d")]),
            Dataset::new("Sports", vec![]),
        ];
        let (blocks, map) = build_summary_panels(&datasets);

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].children.len(), 2);
        assert!(map.contains_key("tech-news"));
        assert!(map.contains_key("sports"));
        assert_eq!(
            blocks[0].children[0].resolve(&map).unwrap().len(),
            1
        );
    }

    #[test]
    fn slugs_are_id_safe_and_stable() {
        assert_eq!(slug("feeds/rust news"), "feeds-rust-news");
        assert_eq!(slug("///"), "source");
        assert_eq!(slug("ABC"), "abc");
    }
}
