use crate::record::Record;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Per-response lookup table that reference-bearing blocks resolve against.
pub type DatasetMap = BTreeMap<String, Vec<Record>>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BlockError {
    #[error("Block '{id}' carries both inline data and a dataset reference")]
    ConflictingSource { id: String },
}

/// Where a block's data comes from: exactly one of an inline payload or a
/// reference key into a sibling [`DatasetMap`], or nothing for pure layout
/// containers. The enum makes "both at once" unrepresentable in memory;
/// deserialization rejects wire payloads that carry both.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum BlockSource {
    #[default]
    None,
    Inline(Vec<Record>),
    Reference(String),
}

/// One node of the renderer-facing result tree.
///
/// Children are owned outright by their parent, so the block graph is a
/// finite, cycle-free, rooted tree by construction; a reference key carries
/// no ownership of the dataset it points at.
///
/// The serialized field names (`id`, `component`, `data`, `data_ref`,
/// `config`, `options`, `children`, `title`, `confidence`) are the stable
/// contract handed to rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "RawBlock", try_from = "RawBlock")]
pub struct Block {
    pub id: String,
    pub component: String,
    source: BlockSource,
    pub config: BTreeMap<String, serde_json::Value>,
    pub options: BTreeMap<String, serde_json::Value>,
    pub children: Vec<Block>,
    pub title: Option<String>,
    pub confidence: Option<f64>,
}

impl Block {
    fn bare(id: impl Into<String>, component: impl Into<String>, source: BlockSource) -> Self {
        Self {
            id: id.into(),
            component: component.into(),
            source,
            config: BTreeMap::new(),
            options: BTreeMap::new(),
            children: Vec::new(),
            title: None,
            confidence: None,
        }
    }

    /// A data-bearing leaf with an inline payload.
    #[must_use]
    pub fn inline(
        id: impl Into<String>,
        component: impl Into<String>,
        records: Vec<Record>,
    ) -> Self {
        Self::bare(id, component, BlockSource::Inline(records))
    }

    /// A leaf that resolves its records through a [`DatasetMap`] key.
    #[must_use]
    pub fn reference(
        id: impl Into<String>,
        component: impl Into<String>,
        key: impl Into<String>,
    ) -> Self {
        Self::bare(id, component, BlockSource::Reference(key.into()))
    }

    /// A layout container with no data source of its own.
    #[must_use]
    pub fn container(id: impl Into<String>, component: impl Into<String>) -> Self {
        Self::bare(id, component, BlockSource::None)
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn confidence(mut self, confidence: f64) -> Self {
        self.confidence = Some(confidence);
        self
    }

    #[must_use]
    pub fn config_value(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.config.insert(name.into(), value);
        self
    }

    #[must_use]
    pub fn option_value(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.options.insert(name.into(), value);
        self
    }

    /// Takes sole ownership of the child; a block can never participate in
    /// more than one parent.
    pub fn push_child(&mut self, child: Block) {
        self.children.push(child);
    }

    #[must_use]
    pub fn child(mut self, child: Block) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub const fn source(&self) -> &BlockSource {
        &self.source
    }

    /// Read-only resolution of this block's records. Inline data resolves to
    /// itself; a reference key is looked up in `datasets`; containers and
    /// dangling references resolve to `None`.
    #[must_use]
    pub fn resolve<'a>(&'a self, datasets: &'a DatasetMap) -> Option<&'a [Record]> {
        match &self.source {
            BlockSource::None => None,
            BlockSource::Inline(records) => Some(records.as_slice()),
            BlockSource::Reference(key) => datasets.get(key).map(Vec::as_slice),
        }
    }

    /// Number of nodes in this subtree, root included.
    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Block::node_count).sum::<usize>()
    }
}

/// Wire mirror of [`Block`]. Keeps `data` and `data_ref` as separate optional
/// fields for the rendering contract while construction-time validation
/// rejects payloads carrying both.
#[derive(Serialize, Deserialize)]
struct RawBlock {
    id: String,
    component: String,
    data: Option<Vec<Record>>,
    data_ref: Option<String>,
    #[serde(default)]
    config: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    options: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    children: Vec<Block>,
    title: Option<String>,
    confidence: Option<f64>,
}

impl From<Block> for RawBlock {
    fn from(block: Block) -> Self {
        let (data, data_ref) = match block.source {
            BlockSource::None => (None, None),
            BlockSource::Inline(records) => (Some(records), None),
            BlockSource::Reference(key) => (None, Some(key)),
        };
        Self {
            id: block.id,
            component: block.component,
            data,
            data_ref,
            config: block.config,
            options: block.options,
            children: block.children,
            title: block.title,
            confidence: block.confidence,
        }
    }
}

impl TryFrom<RawBlock> for Block {
    type Error = BlockError;

    fn try_from(raw: RawBlock) -> Result<Self, Self::Error> {
        let source = match (raw.data, raw.data_ref) {
            (Some(_), Some(_)) => {
                return Err(BlockError::ConflictingSource { id: raw.id });
            }
            (Some(records), None) => BlockSource::Inline(records),
            (None, Some(key)) => BlockSource::Reference(key),
            (None, None) => BlockSource::None,
        };
        Ok(Self {
            id: raw.id,
            component: raw.component,
            source,
            config: raw.config,
            options: raw.options,
            children: raw.children,
            title: raw.title,
            confidence: raw.confidence,
        })
    }
}
