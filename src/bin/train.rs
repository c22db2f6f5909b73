use indicatif::ProgressBar;
use num_format::{Locale, ToFormattedString};

use brewknn::config::AppConfig;
use brewknn::pipeline::{run_category, PipelineOutputs};
use brewknn::stopwatch::Stopwatch;
use brewknn::{io, reviews};

fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1).unwrap_or_default();
    let config = AppConfig::new(config_path);
    env_logger::Builder::new()
        .parse_filters(&config.log.level)
        .init();

    rayon::ThreadPoolBuilder::new()
        .num_threads(config.pipeline.num_workers)
        .build_global()?;

    let corpus = io::read_reviews(&config.data.reviews_path, &config.columns)?;
    print_corpus_stats(corpus.stats(&config.data.reviews_path));

    let params = config.run_params();
    let pb = ProgressBar::new(params.categories.len() as u64);
    let mut outputs = PipelineOutputs::default();
    for category in &params.categories {
        let category_outputs = run_category(&corpus, category, &params)?;
        outputs.top_items.extend(category_outputs.top_items);
        outputs.combinations.extend(category_outputs.combinations);
        outputs.predictions.extend(category_outputs.predictions);
        outputs
            .fit_durations_micros
            .extend(category_outputs.fit_durations_micros);
        pb.inc(1);
    }
    pb.finish_and_clear();

    io::write_records(&config.data.top_items_output_path, &outputs.top_items)?;
    io::write_records(&config.data.combinations_output_path, &outputs.combinations)?;
    io::write_records(&config.data.predictions_output_path, &outputs.predictions)?;

    let mut stopwatch = Stopwatch::new();
    for (user_id, duration_as_micros) in &outputs.fit_durations_micros {
        stopwatch.record(user_id, *duration_as_micros);
    }

    println!("===============================================================");
    println!("===                 BATCH TRAINING FINISHED                ====");
    println!("===============================================================");
    println!(
        "top items written: {}",
        outputs.top_items.len().to_formatted_string(&Locale::en)
    );
    println!(
        "combination rows written: {}",
        outputs.combinations.len().to_formatted_string(&Locale::en)
    );
    println!(
        "prediction rows written: {}",
        outputs.predictions.len().to_formatted_string(&Locale::en)
    );
    println!("Qty model fits: {}", stopwatch.get_n());
    println!("Model fit latency");
    println!(
        "p90 (microseconds): {}",
        stopwatch.get_percentile_in_micros(0.90)
    );
    println!(
        "p95 (microseconds): {}",
        stopwatch.get_percentile_in_micros(0.95)
    );
    println!(
        "p99.5 (microseconds): {}",
        stopwatch.get_percentile_in_micros(0.995)
    );
    Ok(())
}

fn print_corpus_stats(stats: reviews::ReviewTableStats) {
    println!(
        "{}: {} review rows, {} items, {} reviewers, {} categories",
        stats.descriptive_name,
        stats.qty_records.to_formatted_string(&Locale::en),
        stats.qty_unique_item_ids.to_formatted_string(&Locale::en),
        stats.qty_unique_reviewers.to_formatted_string(&Locale::en),
        stats.qty_categories.to_formatted_string(&Locale::en)
    );
}
