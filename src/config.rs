use std::convert::TryInto;
use std::ffi::OsStr;
use std::fs::File;

use justconfig::item::ValueExtractor;
use justconfig::processors::Trim;
use justconfig::sources::env::Env;
use justconfig::sources::text::ConfigText;
use justconfig::ConfPath;
use justconfig::Config;

use crate::config_processors::{SplitList, Unquote};
use crate::evaluation::{DEFAULT_EVAL_K, DEFAULT_FOLDS, DEFAULT_RELEVANCE_THRESHOLD};
use crate::io::ColumnBindings;
use crate::knn::model::{
    KnnParams, DEFAULT_MIN_NEIGHBORS, DEFAULT_NEIGHBORHOOD_SIZE_K, DEFAULT_SEED,
};
use crate::pipeline::{RunParams, DEFAULT_GROUP_SIZE, DEFAULT_TOP_K, DEFAULT_TOP_N};

pub struct AppConfig {
    pub log: LogConfig,
    pub data: DataConfig,
    pub columns: ColumnBindings,
    pub pipeline: PipelineConfig,
    pub knn: KnnConfig,
    pub scoring: ScoringConfig,
}

pub struct LogConfig {
    pub level: String,
}

pub struct DataConfig {
    pub reviews_path: String,
    pub top_items_output_path: String,
    pub combinations_output_path: String,
    pub predictions_output_path: String,
    pub scoring_report_path: String,
}

pub struct PipelineConfig {
    pub categories: Vec<String>,
    pub top_n: usize,
    pub group_size: usize,
    pub top_k: usize,
    pub min_reviews: usize,
    pub num_workers: usize,
}

pub struct KnnConfig {
    pub k: usize,
    pub min_k: usize,
    pub user_based: bool,
    pub seed: u64,
}

pub struct ScoringConfig {
    pub test_category: String,
    pub folds: usize,
    pub eval_k: usize,
    pub threshold: f64,
}

impl AppConfig {
    pub fn new(config_path: String) -> AppConfig {
        // Initialize config object
        let mut conf = Config::default();

        // Check if there is a config file
        if let Ok(config_file) = File::open(&config_path) {
            let config_text = ConfigText::new(config_file, &config_path)
                .expect("Loading configuration file failed.");
            conf.add_source(config_text);
        }

        // Define config params from environment variables
        let config_env = Env::new(&[
            (
                ConfPath::from(&["data", "reviews_path"]),
                OsStr::new("REVIEWS_DATA"),
            ),
            (
                ConfPath::from(&["pipeline", "num_workers"]),
                OsStr::new("NUM_WORKERS"),
            ),
        ]);
        conf.add_source(config_env);

        // Parse into custom config struct
        AppConfig::parse(conf)
    }

    fn parse(conf: justconfig::Config) -> AppConfig {
        AppConfig {
            log: LogConfig::parse(&conf, ConfPath::from(&["log"])),
            data: DataConfig::parse(&conf, ConfPath::from(&["data"])),
            columns: parse_columns(&conf, ConfPath::from(&["columns"])),
            pipeline: PipelineConfig::parse(&conf, ConfPath::from(&["pipeline"])),
            knn: KnnConfig::parse(&conf, ConfPath::from(&["knn"])),
            scoring: ScoringConfig::parse(&conf, ConfPath::from(&["scoring"])),
        }
    }
}

impl LogConfig {
    fn parse(conf: &Config, path: ConfPath) -> LogConfig {
        LogConfig {
            level: conf
                .get(path.push("level"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("info")),
        }
    }
}

impl DataConfig {
    fn parse(conf: &Config, path: ConfPath) -> DataConfig {
        DataConfig {
            reviews_path: conf
                .get(path.push("reviews_path"))
                .unquote()
                .value()
                .unwrap(),
            top_items_output_path: conf
                .get(path.push("top_items_output_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("data/top10.csv")),
            combinations_output_path: conf
                .get(path.push("combinations_output_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("data/combinations.csv")),
            predictions_output_path: conf
                .get(path.push("predictions_output_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("data/preds.csv")),
            scoring_report_path: conf
                .get(path.push("scoring_report_path"))
                .unquote()
                .value()
                .unwrap_or_else(|_| String::from("data/modelscoring.txt")),
        }
    }
}

fn parse_columns(conf: &Config, path: ConfPath) -> ColumnBindings {
    let defaults = ColumnBindings::default();
    let get = |key: &str, default: &str| -> String {
        conf.get(path.push(key))
            .unquote()
            .value()
            .unwrap_or_else(|_| default.to_string())
    };
    ColumnBindings {
        category: get("category", &defaults.category),
        item_id: get("item_id", &defaults.item_id),
        item_name: get("item_name", &defaults.item_name),
        abv: get("abv", &defaults.abv),
        style: get("style", &defaults.style),
        brewery: get("brewery", &defaults.brewery),
        reviewer: get("reviewer", &defaults.reviewer),
        rating: get("rating", &defaults.rating),
    }
}

impl PipelineConfig {
    fn parse(conf: &Config, path: ConfPath) -> PipelineConfig {
        PipelineConfig {
            categories: conf
                .get(path.push("categories"))
                .unquote()
                .split_list()
                .values(1..)
                .unwrap_or_default(),
            top_n: conf
                .get(path.push("top_n"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_TOP_N),
            group_size: conf
                .get(path.push("group_size"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_GROUP_SIZE),
            top_k: conf
                .get(path.push("top_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_TOP_K),
            min_reviews: conf
                .get(path.push("min_reviews"))
                .trim()
                .value()
                .unwrap_or(0),
            num_workers: conf
                .get(path.push("num_workers"))
                .trim()
                .value()
                // Detect number of CPUs
                .unwrap_or_else(|_| sys_info::cpu_num().unwrap_or_default().try_into().unwrap()),
        }
    }
}

impl KnnConfig {
    fn parse(conf: &Config, path: ConfPath) -> KnnConfig {
        KnnConfig {
            k: conf
                .get(path.push("k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_NEIGHBORHOOD_SIZE_K),
            min_k: conf
                .get(path.push("min_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_MIN_NEIGHBORS),
            user_based: conf
                .get(path.push("user_based"))
                .trim()
                .value()
                .unwrap_or(true),
            seed: conf
                .get(path.push("seed"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_SEED),
        }
    }

    pub fn to_params(&self) -> KnnParams {
        KnnParams {
            k: self.k,
            min_k: self.min_k,
            user_based: self.user_based,
            seed: self.seed,
        }
    }
}

impl ScoringConfig {
    fn parse(conf: &Config, path: ConfPath) -> ScoringConfig {
        ScoringConfig {
            test_category: conf
                .get(path.push("test_category"))
                .unquote()
                .value()
                .unwrap_or_default(),
            folds: conf
                .get(path.push("folds"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_FOLDS),
            eval_k: conf
                .get(path.push("eval_k"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_EVAL_K),
            threshold: conf
                .get(path.push("threshold"))
                .trim()
                .value()
                .unwrap_or(DEFAULT_RELEVANCE_THRESHOLD),
        }
    }
}

impl AppConfig {
    /// Bundles the pipeline and model settings into the batch-run parameter
    /// struct the library takes.
    pub fn run_params(&self) -> RunParams {
        RunParams {
            categories: self.pipeline.categories.clone(),
            top_n: self.pipeline.top_n,
            group_size: self.pipeline.group_size,
            top_k: self.pipeline.top_k,
            min_reviews: self.pipeline.min_reviews,
            knn: self.knn.to_params(),
        }
    }
}
