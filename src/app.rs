use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};

use crate::{
    config::AppConfig,
    domain::{Label, Prediction},
    features::{train_test_split, Dataset, Preprocessor, Smote, TfidfVectorizer},
    infrastructure::storage::{artifact_exists, load_artifact, save_artifact},
    mail::{self, ProcessedRow},
    models::{predict_email_class, train_models, ClassifierKind, Predictor, TrainedModel},
};

pub struct SpamFilterApp {
    config: AppConfig,
}

impl SpamFilterApp {
    pub fn new(config: AppConfig) -> Self {
        Self { config }
    }

    pub fn make_dataset(&self, input_dir: Option<PathBuf>, output_dir: Option<PathBuf>) -> Result<PathBuf> {
        let input_dir = input_dir.unwrap_or_else(|| PathBuf::from(&self.config.directories.input_dir));
        if !input_dir.is_dir() {
            bail!("input directory does not exist: {}", input_dir.display());
        }
        let output_csv = match output_dir {
            Some(dir) => dir.join("parsed_emails.csv"),
            None => self.config.artifacts.parsed_csv.clone(),
        };

        tracing::info!(target: "corpus", input = %input_dir.display(), "loading raw data");
        let records = mail::label_corpus(&input_dir, &self.config.corpus)
            .with_context(|| format!("failed to label corpus under {}", input_dir.display()))?;

        ensure_parent(&output_csv)?;
        tracing::info!(target: "corpus", output = %output_csv.display(), records = records.len(), "writing parsed emails");
        mail::write_records(&output_csv, &records)?;
        Ok(output_csv)
    }

    pub fn build_features(&self) -> Result<()> {
        let artifacts = &self.config.artifacts;
        let features = &self.config.features;

        tracing::info!(target: "features", input = %artifacts.parsed_csv.display(), "reading parsed emails");
        let records = mail::read_records(&artifacts.parsed_csv)?;
        if records.is_empty() {
            bail!("no records in {}", artifacts.parsed_csv.display());
        }

        let labels = records
            .iter()
            .map(|record| {
                record
                    .label
                    .with_context(|| format!("record {} has no label", record.filename))
            })
            .collect::<Result<Vec<Label>>>()?;

        tracing::info!(target: "features", "preprocessing email bodies");
        let preprocessor = Preprocessor::new(features.preprocessing().clone());
        let processed: Vec<ProcessedRow> = records
            .iter()
            .map(|record| ProcessedRow {
                filename: record.filename.clone(),
                processed_body: preprocessor.preprocess(&record.body),
            })
            .collect();

        ensure_parent(&artifacts.processed_csv)?;
        tracing::info!(target: "features", output = %artifacts.processed_csv.display(), "saving preprocessed bodies");
        mail::write_processed(&artifacts.processed_csv, &processed)?;

        let bodies: Vec<&str> = processed.iter().map(|row| row.processed_body.as_str()).collect();
        let (vectorizer, rows) = TfidfVectorizer::fit_transform(&bodies, &features.vectorizer)?;
        let dataset = Dataset::new(vectorizer.width(), vectorizer.fingerprint(), rows, labels)?;

        tracing::info!(target: "features", test_size = features.test_size, "splitting into training and testing sets");
        let seed = self.config.training.random_seed;
        let (train, test) = train_test_split(&dataset, features.test_size, seed)?;

        tracing::info!(target: "features", before = ?train.class_counts(), "oversampling the training split");
        let train = Smote::new(features.smote_neighbors, seed).fit_resample(&train)?;
        tracing::info!(
            target: "features",
            train = ?train.class_counts(),
            test = ?test.class_counts(),
            "class counts after balancing"
        );

        save_artifact(&artifacts.train_file, &train)?;
        save_artifact(&artifacts.test_file, &test)?;
        save_artifact(&artifacts.vectorizer_file, &vectorizer)?;
        Ok(())
    }

    pub fn train(&self) -> Result<TrainedModel> {
        let artifacts = &self.config.artifacts;

        tracing::info!(target: "train", path = %artifacts.train_file.display(), "loading training data");
        let train: Dataset = load_artifact(&artifacts.train_file)?;
        tracing::info!(target: "train", path = %artifacts.test_file.display(), "loading testing data");
        let test: Dataset = load_artifact(&artifacts.test_file)?;

        let candidates = ClassifierKind::candidates(self.config.training.random_seed);
        let model = train_models(&train, &test, &candidates)?;

        tracing::info!(
            target: "train",
            model = %model.name,
            accuracy = %format!("{:.4}", model.accuracy),
            path = %artifacts.model_file.display(),
            "saving the best model"
        );
        save_artifact(&artifacts.model_file, &model)?;
        Ok(model)
    }

    /// Brings the artifacts up to date, running only the stages that are missing.
    pub fn setup(&self) -> Result<()> {
        let artifacts = &self.config.artifacts;
        if artifact_exists(&artifacts.model_file) && artifact_exists(&artifacts.vectorizer_file) {
            tracing::info!("model and vectorizer already exist; no need to retrain");
            return Ok(());
        }

        let have_splits = artifact_exists(&artifacts.train_file)
            && artifact_exists(&artifacts.test_file)
            && artifact_exists(&artifacts.vectorizer_file);
        if !have_splits {
            if !artifacts.parsed_csv.is_file() {
                tracing::info!("parsed corpus not found; parsing raw emails first");
                self.make_dataset(None, None)?;
            }
            tracing::info!("train and test data not found; building features first");
            self.build_features()?;
        }

        tracing::info!("training the model");
        self.train()?;
        tracing::info!("setup completed");
        Ok(())
    }

    pub fn predict(&self, text: &str) -> Result<Prediction> {
        let artifacts = &self.config.artifacts;
        predict_email_class(text, &artifacts.vectorizer_file, &artifacts.model_file)
    }

    pub fn load_predictor(&self) -> Result<Predictor> {
        let artifacts = &self.config.artifacts;
        Predictor::load(&artifacts.vectorizer_file, &artifacts.model_file)
    }

    /// Reads email bodies separated by blank lines and answers each one.
    ///
    /// The artifacts are loaded on first use and kept for the rest of the
    /// session. A failure is reported for the request that hit it and the
    /// loop carries on.
    pub fn serve<R: BufRead, W: Write>(&self, input: R, mut output: W) -> Result<()> {
        let mut predictor: Option<Predictor> = None;
        let mut block = String::new();

        for line in input.lines() {
            let line = line.context("failed to read request")?;
            if !line.trim().is_empty() {
                block.push_str(&line);
                block.push('\n');
                continue;
            }
            self.answer(&mut predictor, &mut block, &mut output)?;
        }
        self.answer(&mut predictor, &mut block, &mut output)
    }

    fn answer<W: Write>(&self, predictor: &mut Option<Predictor>, block: &mut String, output: &mut W) -> Result<()> {
        let body = block.trim();
        if body.is_empty() {
            block.clear();
            return Ok(());
        }

        if predictor.is_none() {
            match self.load_predictor() {
                Ok(loaded) => *predictor = Some(loaded),
                Err(err) => tracing::error!(target: "predict", error = %format!("{err:#}"), "failed to load artifacts"),
            }
        }
        let reply = match predictor.as_ref() {
            Some(predictor) => format!("Prediction: {}", predictor.predict(body)),
            None => "Error: model artifacts are unavailable; run `setup` first".to_string(),
        };
        writeln!(output, "{reply}")?;
        output.flush()?;
        block.clear();
        Ok(())
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.display()))?;
    }
    Ok(())
}

pub fn serve_stdio(app: &SpamFilterApp) -> Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    app.serve(stdin.lock(), stdout.lock())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{
        ArtifactConfig, CorpusConfig, DirectoryConfig, FeatureConfig, LoggingConfig,
        TrainingConfig,
    };
    use crate::features::VectorizerConfig;
    use crate::infrastructure::directories::ensure_directories;

    const SPAM: &[&str] = &[
        "Claim your FREE reward now!!! Limited offer, free money",
        "Win cash prizes, free money waiting, claim today",
        "Cheap pills, free shipping, buy now and claim bonus",
        "You have won a free lottery reward, claim your money",
        "Exclusive free offer: earn money fast, claim reward",
        "Free credit report, claim your cash reward instantly",
    ];
    const HAM: &[&str] = &[
        "Can we move the project meeting to Thursday afternoon?",
        "Attached is the quarterly report for your review",
        "Lunch tomorrow with the team at the usual place",
        "The build failed again, please check the latest commit",
        "Notes from yesterday's design review are in the wiki",
        "Reminder: team standup moves to the larger room",
        "Please send me the slides before the meeting",
        "Thanks for the code review, I pushed the fixes",
        "Holiday schedule for the office is now posted",
        "Could you look at the failing test in the parser module",
    ];

    fn config(root: &Path) -> AppConfig {
        let at = |p: &str| root.join(p);
        let dir = |p: &str| at(p).to_string_lossy().into_owned();
        AppConfig {
            directories: DirectoryConfig {
                input_dir: dir("data/raw"),
                interim_dir: dir("data/interim"),
                processed_dir: dir("data/processed"),
                models_dir: dir("models"),
                logs_dir: dir("logs"),
            },
            artifacts: ArtifactConfig {
                parsed_csv: at("data/interim/parsed_emails.csv"),
                processed_csv: at("data/processed/processed_email.csv"),
                train_file: at("data/processed/train_data.bin"),
                test_file: at("data/processed/test_data.bin"),
                vectorizer_file: at("models/tfidf_vectorizer.bin"),
                model_file: at("models/spam_classifier_model.bin"),
            },
            corpus: CorpusConfig {
                ham_categories: vec!["easy_ham".into(), "hard_ham".into()],
                spam_categories: vec!["spam_2".into()],
            },
            features: FeatureConfig {
                vectorizer: VectorizerConfig::default(),
                test_size: 0.25,
                smote_neighbors: 3,
            },
            training: TrainingConfig { random_seed: 42 },
            logging: LoggingConfig {
                level: "info".into(),
            },
        }
    }

    fn write_corpus(root: &Path) {
        let raw = root.join("data/raw");
        for (category, bodies) in [("easy_ham", &HAM[..5]), ("hard_ham", &HAM[5..]), ("spam_2", SPAM)] {
            let dir = raw.join(category);
            fs::create_dir_all(&dir).unwrap();
            for (i, body) in bodies.iter().enumerate() {
                let email = format!(
                    "From: sender{i}@example.com\r\nTo: me@example.com\r\nSubject: {category} {i}\r\n\r\n{body}\r\n"
                );
                fs::write(dir.join(format!("{category}.{i:04}")), email).unwrap();
            }
        }
    }

    fn app(root: &Path) -> SpamFilterApp {
        let config = config(root);
        ensure_directories(&config.directories).unwrap();
        SpamFilterApp::new(config)
    }

    #[test]
    fn setup_runs_the_whole_pipeline() {
        let root = tempfile::tempdir().unwrap();
        write_corpus(root.path());
        let app = app(root.path());

        app.setup().unwrap();

        let records = mail::read_records(&app.config.artifacts.parsed_csv).unwrap();
        assert_eq!(records.len(), SPAM.len() + HAM.len());
        let train: Dataset = load_artifact(&app.config.artifacts.train_file).unwrap();
        let test: Dataset = load_artifact(&app.config.artifacts.test_file).unwrap();
        let [ham, spam] = train.class_counts();
        assert_eq!(ham, spam);
        assert_eq!(test.len(), 4);
        assert_eq!(train.fingerprint, test.fingerprint);
        assert!(app.config.artifacts.processed_csv.is_file());

        let predictor = app.load_predictor().unwrap();
        assert_eq!(predictor.model().fingerprint, train.fingerprint);
    }

    #[test]
    fn serve_answers_each_block_and_survives_missing_artifacts() {
        let root = tempfile::tempdir().unwrap();
        let app = app(root.path());
        let input = "Free money!!!\nClaim now\n\n\nmeeting notes\n";
        let mut output = Vec::new();

        app.serve(input.as_bytes(), &mut output).unwrap();

        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines.iter().all(|line| line.starts_with("Error:")));
    }

    /// Yields one request per read and deletes `artifacts` before the second,
    /// so a later answer can only come from an already loaded predictor.
    struct DeletingInput {
        requests: Vec<&'static str>,
        artifacts: Vec<PathBuf>,
        served: usize,
    }

    impl io::Read for DeletingInput {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let Some(request) = self.requests.get(self.served) else {
                return Ok(0);
            };
            if self.served == 1 {
                for path in &self.artifacts {
                    fs::remove_file(path)?;
                }
            }
            self.served += 1;
            buf[..request.len()].copy_from_slice(request.as_bytes());
            Ok(request.len())
        }
    }

    #[test]
    fn serve_reuses_the_loaded_predictor() {
        let root = tempfile::tempdir().unwrap();
        write_corpus(root.path());
        let app = app(root.path());
        app.setup().unwrap();

        let artifacts = &app.config.artifacts;
        let input = DeletingInput {
            requests: vec![
                "Claim your FREE reward now!!!\nfree money\n\n",
                "project meeting notes\n",
            ],
            artifacts: vec![artifacts.vectorizer_file.clone(), artifacts.model_file.clone()],
            served: 0,
        };
        let mut output = Vec::new();

        app.serve(io::BufReader::new(input), &mut output).unwrap();

        assert!(!artifacts.model_file.exists());
        let text = String::from_utf8(output).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2, "{text}");
        assert!(lines[0].starts_with("Prediction: Spam"), "{text}");
        assert!(lines[1].starts_with("Prediction: "), "{text}");
    }

    #[test]
    fn make_dataset_requires_the_input_directory() {
        let root = tempfile::tempdir().unwrap();
        let app = app(root.path());
        let err = app.make_dataset(None, None).unwrap_err();
        assert!(err.to_string().contains("data/raw"));
    }
}
