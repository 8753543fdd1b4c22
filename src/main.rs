use anyhow::Context;
use clap::{Arg, ArgAction, Command};
use log::LevelFilter;
use phish_explainer::classifier::{Classifier, TfidfLogisticClassifier};
use phish_explainer::message::{collect_message_files, load_message};
use phish_explainer::report::{self, Verdict};
use phish_explainer::{Explainer, RuleConfig, RuleSet};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let matches = Command::new("phish-explainer")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Phishing classifier with rule-based explanations")
        .arg(
            Arg::new("text")
                .long("text")
                .value_name("TEXT")
                .help("Raw email text to classify")
                .conflicts_with_all(["file", "dir"]),
        )
        .arg(
            Arg::new("file")
                .long("file")
                .value_name("FILE")
                .help("Path to a .eml or .txt message")
                .conflicts_with("dir"),
        )
        .arg(
            Arg::new("dir")
                .long("dir")
                .value_name("DIR")
                .help("Directory of .eml/.txt messages for batch mode"),
        )
        .arg(
            Arg::new("json-out")
                .long("json-out")
                .value_name("FILE")
                .help("Write JSON result(s) to this path"),
        )
        .arg(
            Arg::new("csv-out")
                .long("csv-out")
                .value_name("FILE")
                .help("Batch mode: also write predictions CSV to this path"),
        )
        .arg(
            Arg::new("threshold")
                .long("threshold")
                .value_name("PROB")
                .help("Probability cutoff for labeling as phish")
                .value_parser(clap::value_parser!(f64))
                .default_value("0.5"),
        )
        .arg(
            Arg::new("model")
                .short('m')
                .long("model")
                .value_name("FILE")
                .help("Classifier model (JSON)")
                .default_value("models/model.json"),
        )
        .arg(
            Arg::new("rules")
                .short('r')
                .long("rules")
                .value_name("FILE")
                .help("Rule configuration (YAML); built-in rules when omitted"),
        )
        .arg(
            Arg::new("generate-rules")
                .long("generate-rules")
                .value_name("FILE")
                .help("Write the built-in rule configuration to FILE and exit")
                .action(ArgAction::Set),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable debug logging of every detected signal")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let log_level = if matches.get_flag("verbose") {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if let Some(path) = matches.get_one::<String>("generate-rules") {
        if let Err(e) = RuleConfig::default().to_file(path) {
            eprintln!("Error writing rule configuration: {e:#}");
            process::exit(1);
        }
        println!("Default rule configuration written to {}", path);
        return;
    }

    if let Err(e) = run(&matches).await {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

async fn run(matches: &clap::ArgMatches) -> anyhow::Result<()> {
    let threshold =
        report::validate_threshold(*matches.get_one::<f64>("threshold").unwrap_or(&0.5))?;

    let rules = match matches.get_one::<String>("rules") {
        Some(path) => RuleSet::from_file(path)?,
        None => RuleSet::compile(&RuleConfig::default())?,
    };
    let explainer = Arc::new(Explainer::new(rules));

    let model_path = matches
        .get_one::<String>("model")
        .map(String::as_str)
        .unwrap_or("models/model.json");
    let classifier: Arc<dyn Classifier> = Arc::new(TfidfLogisticClassifier::from_file(model_path)?);

    let json_out = matches.get_one::<String>("json-out").map(PathBuf::from);

    if let Some(text) = matches.get_one::<String>("text") {
        let prob = classifier.predict_probability(text);
        let verdict = Verdict::new(None, prob, threshold, explainer.explain(text, ""));
        print!("{}", report::render(&verdict));
        if let Some(path) = &json_out {
            report::write_json(path, &verdict)?;
        }
        return Ok(());
    }

    if let Some(file) = matches.get_one::<String>("file") {
        let verdict = evaluate_file(&explainer, classifier.as_ref(), Path::new(file), threshold)?;
        print!("{}", report::render(&verdict));
        if let Some(path) = &json_out {
            report::write_json(path, &verdict)?;
        }
        return Ok(());
    }

    if let Some(dir) = matches.get_one::<String>("dir") {
        let files = collect_message_files(Path::new(dir))?;

        let mut handles = Vec::with_capacity(files.len());
        for path in files {
            let explainer = Arc::clone(&explainer);
            let classifier = Arc::clone(&classifier);
            handles.push(tokio::task::spawn_blocking(move || {
                evaluate_file(&explainer, classifier.as_ref(), &path, threshold)
            }));
        }

        let mut verdicts = Vec::with_capacity(handles.len());
        for handle in handles {
            verdicts.push(handle.await.context("Batch worker failed")??);
        }

        print!("{}", report::batch_csv(&verdicts, 4));
        if let Some(path) = &json_out {
            report::write_json(path, &verdicts)?;
        }
        if let Some(path) = matches.get_one::<String>("csv-out") {
            report::write_csv(Path::new(path), &verdicts)?;
        }
        return Ok(());
    }

    anyhow::bail!("one of --text, --file or --dir is required")
}

fn evaluate_file(
    explainer: &Explainer,
    classifier: &dyn Classifier,
    path: &Path,
    threshold: f64,
) -> anyhow::Result<Verdict> {
    let message = load_message(path)?;
    let prob = classifier.predict_probability(&message.classifier_text());
    let explain = explainer.explain(&message.body, &message.headers);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    log::debug!("{}: prob={:.4} cues={}", name, prob, explain.cues.len());

    Ok(Verdict::new(Some(name), prob, threshold, explain))
}
