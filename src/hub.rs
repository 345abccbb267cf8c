//! Hub datasets read through the dataset viewer rows API.

use log::{debug, info};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;

use crate::dataset::{feature_kind, LoadedDataset, MemorySplit, RecordStream, Split};
use crate::error::{ManifestError, Result};
use crate::types::{Column, Record, Schema};

pub const DEFAULT_DATASETS_SERVER: &str = "https://datasets-server.huggingface.co";
pub const PAGE_LENGTH: usize = 100;
pub(crate) const DEFAULT_CONFIG: &str = "default";

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SplitInfo {
    pub dataset: String,
    pub config: String,
    pub split: String,
}

#[derive(Debug, Deserialize)]
struct SplitsResponse {
    splits: Vec<SplitInfo>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Feature {
    pub name: String,
    #[serde(rename = "type")]
    pub feature_type: serde_json::Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RowItem {
    pub row_idx: usize,
    pub row: Record,
}

/// One page of the rows endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RowsPage {
    #[serde(default)]
    pub features: Vec<Feature>,
    pub rows: Vec<RowItem>,
    pub num_rows_total: Option<usize>,
}

impl RowsPage {
    pub fn schema(&self) -> Schema {
        Schema::new(
            self.features
                .iter()
                .map(|f| Column {
                    name: f.name.clone(),
                    kind: feature_kind(&f.feature_type),
                })
                .collect(),
        )
    }
}

/// Identifies one split of one config of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitRef {
    pub dataset: String,
    pub config: String,
    pub split: String,
}

/// The two dataset viewer endpoints the loader needs.
pub trait RowsApi {
    fn splits(&self, dataset: &str) -> Result<Vec<SplitInfo>>;
    fn rows(&self, split: &SplitRef, offset: usize, length: usize) -> Result<RowsPage>;
}

/// Blocking HTTP client for the dataset viewer API.
pub struct HubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HubClient {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        })
    }

    fn get_json<T: DeserializeOwned>(&self, endpoint: &str, query: &[(&str, String)]) -> Result<T> {
        let url = format!("{}/{}", self.base_url, endpoint);
        debug!("GET {} {:?}", url, query);
        let mut request = self.client.get(&url).query(query);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        Ok(request.send()?.error_for_status()?.json()?)
    }
}

impl RowsApi for HubClient {
    fn splits(&self, dataset: &str) -> Result<Vec<SplitInfo>> {
        let response: SplitsResponse = self.get_json("splits", &[("dataset", dataset.to_string())])?;
        Ok(response.splits)
    }

    fn rows(&self, split: &SplitRef, offset: usize, length: usize) -> Result<RowsPage> {
        self.get_json(
            "rows",
            &[
                ("dataset", split.dataset.clone()),
                ("config", split.config.clone()),
                ("split", split.split.clone()),
                ("offset", offset.to_string()),
                ("length", length.to_string()),
            ],
        )
    }
}

/// Pick the config to read: the requested one, else `default`, else the only one.
pub fn choose_config(splits: &[SplitInfo], subset: Option<&str>) -> Result<String> {
    let mut configs: Vec<String> = Vec::new();
    for info in splits {
        if !configs.contains(&info.config) {
            configs.push(info.config.clone());
        }
    }

    match subset {
        Some(subset) if configs.iter().any(|c| c == subset) => Ok(subset.to_string()),
        Some(subset) => Err(ManifestError::ConfigNotFound {
            config: subset.to_string(),
            available: configs,
        }),
        None if configs.iter().any(|c| c == DEFAULT_CONFIG) => Ok(DEFAULT_CONFIG.to_string()),
        None if configs.len() == 1 => Ok(configs.remove(0)),
        None => Err(ManifestError::ConfigRequired { available: configs }),
    }
}

/// Load every split of the chosen config. Streaming splits page lazily;
/// otherwise all rows are fetched here.
pub fn load_hub_dataset<A: RowsApi + 'static>(
    api: A,
    dataset: &str,
    subset: Option<&str>,
    streaming: bool,
) -> Result<LoadedDataset> {
    let infos = api.splits(dataset)?;
    let config = choose_config(&infos, subset)?;
    info!("Using config: {}", config);

    let api = Rc::new(api);
    let mut splits: BTreeMap<String, Split> = BTreeMap::new();
    for info in infos.into_iter().filter(|i| i.config == config) {
        let split_ref = SplitRef {
            dataset: dataset.to_string(),
            config: config.clone(),
            split: info.split.clone(),
        };
        let mut stream = HubSplit::new(Rc::clone(&api), split_ref);
        let split: Split = if streaming {
            Box::new(stream)
        } else {
            let schema = stream.schema()?;
            let records = stream.collect::<Result<Vec<_>>>()?;
            Box::new(MemorySplit::new(records, schema))
        };
        splits.insert(info.split, split);
    }
    Ok(LoadedDataset::Splits(splits))
}

/// Rows of one hub split, fetched a page at a time.
pub struct HubSplit<A: RowsApi> {
    api: Rc<A>,
    split: SplitRef,
    offset: usize,
    buffer: VecDeque<Record>,
    schema: Option<Schema>,
    total: Option<usize>,
    started: bool,
    done: bool,
}

impl<A: RowsApi> HubSplit<A> {
    pub fn new(api: Rc<A>, split: SplitRef) -> Self {
        Self {
            api,
            split,
            offset: 0,
            buffer: VecDeque::new(),
            schema: None,
            total: None,
            started: false,
            done: false,
        }
    }

    fn fetch_page(&mut self) -> Result<()> {
        let page = self.api.rows(&self.split, self.offset, PAGE_LENGTH)?;
        if !self.started {
            self.started = true;
            self.schema = Some(page.schema());
            self.total = page.num_rows_total;
        }
        let fetched = page.rows.len();
        self.offset += fetched;
        self.buffer.extend(page.rows.into_iter().map(|item| item.row));
        if fetched == 0 || self.total.is_some_and(|total| self.offset >= total) {
            self.done = true;
        }
        Ok(())
    }
}

impl<A: RowsApi> Iterator for HubSplit<A> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.buffer.is_empty() && !self.done {
            if let Err(e) = self.fetch_page() {
                self.done = true;
                return Some(Err(e));
            }
        }
        self.buffer.pop_front().map(Ok)
    }
}

impl<A: RowsApi> RecordStream for HubSplit<A> {
    fn schema(&mut self) -> Result<Option<Schema>> {
        if !self.started && !self.done {
            self.fetch_page()?;
        }
        Ok(self.schema.clone())
    }

    fn num_rows(&self) -> Option<usize> {
        self.total
    }
}
