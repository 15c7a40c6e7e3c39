use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

use super::runner::PackageRunner;
use super::stats::RunStats;
use crate::ai::{
    CachePolicy, CachedGenerator, GenerationOptions, ResponseCache, SharedBackend, create_backend,
};
use crate::analyzer::SymbolRegistry;
use crate::config::Config;
use crate::constants::index::SIM_SEARCH_TOP_K;
use crate::index::{MemoryVectorStore, SharedVectorStore};
use crate::project::{ConfigChooser, ProjectClassifier, RuleSet, build_package_files};
use crate::publish::{GithubClient, Publisher, PullRequestApi};
use crate::types::{AutodocError, Result};
use crate::workdir::{GitBackend, GitCli, SourceLocation, WorkdirState, WorkdirSynchronizer};

/// Everything one documentation run needs to know
#[derive(Debug, Clone)]
pub struct RunRequest {
    pub source: SourceLocation,
    /// Rule file path or rule name; `None` matches every rule
    pub selector: Option<String>,
    /// Package allow-list; `None` runs every package
    pub packages: Option<Vec<String>>,
    pub light_check: bool,
    pub with_file_summary: bool,
    pub overwrite_readme: bool,
    pub cache_policy: CachePolicy,
    /// Index sources and summaries even when disabled in config
    pub embeddings: bool,
    pub create_pr: bool,
}

impl RunRequest {
    pub fn new(source: SourceLocation) -> Self {
        Self {
            source,
            selector: None,
            packages: None,
            light_check: false,
            with_file_summary: false,
            overwrite_readme: false,
            cache_policy: CachePolicy::default(),
            embeddings: false,
            create_pr: false,
        }
    }
}

/// Result of a successful run
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunArtifacts {
    pub stats: RunStats,
    pub pull_request_url: Option<String>,
}

/// End-to-end run: synchronize, classify, generate, optionally publish.
///
/// The workdir cleanup handle lives in the run's [`WorkdirState`] and fires when
/// the state is dropped, so every exit path removes transient clones.
pub struct Session {
    config: Config,
    rules: RuleSet,
    git: Arc<dyn GitBackend>,
    backend: SharedBackend,
    pull_requests: Option<Arc<dyn PullRequestApi>>,
    vector_store: Option<SharedVectorStore>,
}

impl Session {
    /// Session using the `git` CLI, the configured backend and rule directory
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let rules = RuleSet::load_or_builtin(&config.rules.dir)?;
        let backend = create_backend(&config.llm)?;
        Ok(Self::from_parts(
            config,
            rules,
            Arc::new(GitCli::new()),
            backend,
        ))
    }

    pub fn from_parts(
        config: Config,
        rules: RuleSet,
        git: Arc<dyn GitBackend>,
        backend: SharedBackend,
    ) -> Self {
        Self {
            config,
            rules,
            git,
            backend,
            pull_requests: None,
            vector_store: None,
        }
    }

    /// Pull request service; defaults to the GitHub REST API
    pub fn with_pull_requests(mut self, api: Arc<dyn PullRequestApi>) -> Self {
        self.pull_requests = Some(api);
        self
    }

    /// Vector store; defaults to an in-memory store named after the project
    pub fn with_vector_store(mut self, store: SharedVectorStore) -> Self {
        self.vector_store = Some(store);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub async fn run<W: Write + Send>(
        &self,
        request: &RunRequest,
        chooser: &mut dyn ConfigChooser,
        out: &mut W,
    ) -> Result<RunArtifacts> {
        let state = WorkdirSynchronizer::new(self.git.clone(), &self.config.workdir.root)
            .with_keep(self.config.workdir.keep)
            .sync(&request.source)
            .await?;
        let project_name = state.project_name();
        info!(project = %project_name, dir = %state.local_path.display(), "Workdir ready");

        let publisher = if request.create_pr {
            Some(self.publisher(&state, &request.source)?)
        } else {
            None
        };

        let classifier =
            ProjectClassifier::new(self.rules.clone()).with_light_check(request.light_check);
        let project =
            classifier.resolve(&state.local_path, request.selector.as_deref(), chooser)?;

        let generator = CachedGenerator::new(
            self.backend.clone(),
            ResponseCache::new(&self.config.cache.path),
            self.config.llm.model.as_str(),
        )
        .with_options(GenerationOptions::new(
            project.stop_words.clone(),
            self.config.llm.repetition_penalty,
        ))
        .with_policy(request.cache_policy);

        let index = if request.embeddings || self.config.embeddings.enabled {
            let store = self.vector_store.clone().unwrap_or_else(|| {
                Arc::new(MemoryVectorStore::new(project_name.as_str())) as SharedVectorStore
            });
            writeln!(
                out,
                "Initialized vector store with {} as project name",
                project_name
            )?;
            Some(store)
        } else {
            None
        };

        let files = build_package_files(&project, &SymbolRegistry::with_defaults())?;
        let runner = PackageRunner::new(&project, &generator)
            .with_index(index.clone())
            .with_packages(request.packages.clone())
            .with_overwrite_readme(request.overwrite_readme)
            .with_file_summary(request.with_file_summary);

        let outcome = async {
            let stats = runner.run(&files, out).await?;
            let pull_request_url = match (&publisher, &state.repository) {
                (Some(publisher), Some(repo)) => Some(publisher.publish(repo).await?),
                _ => None,
            };
            Ok::<_, AutodocError>(RunArtifacts {
                stats,
                pull_request_url,
            })
        }
        .await;

        let prompt = &self.config.embeddings.sim_search_test_prompt;
        if let Some(index) = &index
            && !prompt.is_empty()
            && let Err(e) = similarity_check(index, prompt, out).await
        {
            warn!(error = %e, "Similarity search self check failed");
        }

        outcome
    }

    fn publisher(&self, state: &WorkdirState, source: &SourceLocation) -> Result<Publisher> {
        if state.repository.is_none() {
            return Err(AutodocError::InvalidInput(
                "pull requests require a repository URL source".to_string(),
            ));
        }
        let api: Arc<dyn PullRequestApi> = match &self.pull_requests {
            Some(api) => api.clone(),
            None => {
                let token = self.github_token(source).ok_or_else(|| {
                    AutodocError::Config(
                        "GitHub token required to open pull requests (set GH_TOKEN or github.token)"
                            .to_string(),
                    )
                })?;
                Arc::new(GithubClient::new(&self.config.github.api_base, token)?)
            }
        };
        Ok(Publisher::new(self.git.clone(), api))
    }

    fn github_token(&self, source: &SourceLocation) -> Option<SecretString> {
        if let SourceLocation::Remote {
            credentials: Some(creds),
            ..
        } = source
            && !creds.token.expose_secret().is_empty()
        {
            return Some(SecretString::from(creds.token.expose_secret().to_string()));
        }
        self.config
            .github
            .token
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(|t| SecretString::from(t.to_string()))
    }
}

/// Query the index with a test prompt and print the best hits
pub async fn similarity_check<W: Write + Send>(
    index: &SharedVectorStore,
    prompt: &str,
    out: &mut W,
) -> Result<()> {
    let results = index.similarity_search(prompt, SIM_SEARCH_TOP_K).await?;
    if results.is_empty() {
        return Err(AutodocError::Indexing(format!(
            "no similarity search results found for '{}' test prompt",
            prompt
        )));
    }

    write!(
        out,
        "\n\nSimilarity search results for a test prompt \"{}\":\n",
        prompt
    )?;
    for (i, hit) in results.iter().enumerate() {
        writeln!(out, "{}: score {:.6}", i, hit.score)?;
        for (key, value) in &hit.document.metadata {
            writeln!(out, "    {}: {}", key, value)?;
        }
        write!(out, "\n{}\n\n", hit.document.content)?;
    }
    Ok(())
}
