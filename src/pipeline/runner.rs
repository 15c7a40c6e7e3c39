use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::render::{
    FileSummaries, code_prompt, dir_file_structure, file_map_to_md, package_prompt, readme_target,
};
use super::stats::RunStats;
use crate::ai::CachedGenerator;
use crate::analyzer::scanner::relative_parent;
use crate::constants::artifacts::FILES;
use crate::constants::generation::EMPTY_FILE_SENTINEL;
use crate::constants::project::ROOT_PACKAGE;
use crate::index::{Document, SharedVectorStore};
use crate::project::{PackageFileMap, ProjectConfig, PromptSet};
use crate::types::Result;

/// Split a comma-separated package allow-list, dropping blank entries
pub fn parse_package_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Drives a package file map through the generator and writes package docs.
///
/// Packages run in key order, files in list order, one generation call at a
/// time. The first I/O, generation or indexing error aborts the run; files
/// already written stay on disk.
pub struct PackageRunner<'a> {
    config: &'a ProjectConfig,
    generator: &'a CachedGenerator,
    index: Option<SharedVectorStore>,
    packages: Option<Vec<String>>,
    overwrite_readme: bool,
    with_file_summary: bool,
}

impl<'a> PackageRunner<'a> {
    pub fn new(config: &'a ProjectConfig, generator: &'a CachedGenerator) -> Self {
        Self {
            config,
            generator,
            index: None,
            packages: None,
            overwrite_readme: false,
            with_file_summary: false,
        }
    }

    /// Forward sources and summaries to a vector store
    pub fn with_index(mut self, index: Option<SharedVectorStore>) -> Self {
        self.index = index;
        self
    }

    /// Only run the listed package keys; `None` or an empty list runs all
    pub fn with_packages(mut self, packages: Option<Vec<String>>) -> Self {
        self.packages = packages.filter(|p| !p.is_empty());
        self
    }

    pub fn with_overwrite_readme(mut self, overwrite: bool) -> Self {
        self.overwrite_readme = overwrite;
        self
    }

    /// Also write `FILES.md` with every per-file summary
    pub fn with_file_summary(mut self, enabled: bool) -> Self {
        self.with_file_summary = enabled;
        self
    }

    fn is_selected(&self, package: &str) -> bool {
        self.packages
            .as_ref()
            .is_none_or(|allowed| allowed.iter().any(|p| p == package))
    }

    /// Run every selected package, printing progress and summaries to `out`
    pub async fn run<W: Write + Send>(
        &self,
        files: &PackageFileMap,
        out: &mut W,
    ) -> Result<RunStats> {
        let prompts = self.config.prompt_set(self.generator.model())?;
        let mut stats = RunStats::default();

        for (package, package_files) in files {
            if !self.is_selected(package) {
                debug!(package = %package, "Package not in allow-list, skipping");
                continue;
            }
            self.run_package(package, package_files, prompts, &mut stats, out)
                .await?;
        }

        info!(
            fallback_files = stats.fallback_file_responses.len(),
            empty_files = stats.empty_file_responses.len(),
            fallback_packages = stats.fallback_package_responses.len(),
            empty_packages = stats.empty_package_responses.len(),
            "Package run complete"
        );
        Ok(stats)
    }

    async fn run_package<W: Write + Send>(
        &self,
        package: &str,
        files: &[String],
        prompts: &PromptSet,
        stats: &mut RunStats,
        out: &mut W,
    ) -> Result<()> {
        writeln!(out, "Package {}", package)?;

        let Some(first) = files.first() else {
            warn!(package = %package, "No matching files for package, skipping");
            return Ok(());
        };
        let pkg_dir = self.package_dir(first);

        let mut summaries = FileSummaries::new();
        for rel in files {
            let summary = self.summarize_file(package, rel, prompts, stats, out).await?;
            summaries.insert(rel.clone(), summary);
        }

        // The root package owns only the root's files, not the whole tree
        let depth = (relative_parent(first) == ROOT_PACKAGE).then_some(1);
        let structure = dir_file_structure(package, &pkg_dir, depth).unwrap_or_else(|e| {
            warn!(package = %package, error = %e, "Failed to list package directory");
            String::new()
        });

        writeln!(out, "Summary for a package {}: ", package)?;
        let mut summary = self
            .generator
            .generate(&package_prompt(&prompts.package, &structure, &summaries))
            .await?;
        if summary.trim().is_empty()
            && let Some(fallback) = &prompts.package_fallback
        {
            stats.fallback_package_responses.push(package.to_string());
            summary = self
                .generator
                .generate(&package_prompt(fallback, &structure, &summaries))
                .await?;
        }
        if summary.trim().is_empty() {
            stats.empty_package_responses.push(package.to_string());
            writeln!(out, "[WARN] empty package summary")?;
        } else {
            writeln!(out, "{}", summary)?;
        }
        writeln!(out)?;

        self.push_documents(
            out,
            vec![Document::summary(package, None, summary.as_str())],
        )
        .await?;

        let readme = pkg_dir.join(readme_target(&pkg_dir, self.overwrite_readme)?);
        tokio::fs::write(&readme, &summary).await?;
        debug!(path = %readme.display(), "Wrote package summary");

        if self.with_file_summary {
            tokio::fs::write(pkg_dir.join(FILES), file_map_to_md(&summaries)).await?;
        }
        Ok(())
    }

    async fn summarize_file<W: Write + Send>(
        &self,
        package: &str,
        rel: &str,
        prompts: &PromptSet,
        stats: &mut RunStats,
        out: &mut W,
    ) -> Result<String> {
        writeln!(out, "{}", rel)?;
        let full_path = self.config.root_path.join(rel);
        let bytes = tokio::fs::read(&full_path).await?;
        let content = String::from_utf8_lossy(&bytes);

        let mut summary = EMPTY_FILE_SENTINEL.to_string();
        if !content.trim().is_empty() {
            summary = self
                .generator
                .generate(&code_prompt(&prompts.code, &content))
                .await?;
            if summary.trim().is_empty()
                && let Some(fallback) = &prompts.code_fallback
            {
                stats
                    .fallback_file_responses
                    .push(full_path.display().to_string());
                summary = self
                    .generator
                    .generate(&code_prompt(fallback, &content))
                    .await?;
            }
        }

        if summary.trim().is_empty() {
            stats
                .empty_file_responses
                .push(full_path.display().to_string());
            writeln!(out, "[WARN] empty file summary!")?;
        } else {
            writeln!(out, "{}", summary)?;
        }
        writeln!(out)?;

        self.push_documents(
            out,
            vec![
                Document::code(package, rel, &*content),
                Document::summary(package, Some(rel), summary.as_str()),
            ],
        )
        .await?;
        Ok(summary)
    }

    async fn push_documents<W: Write + Send>(
        &self,
        out: &mut W,
        documents: Vec<Document>,
    ) -> Result<()> {
        let Some(index) = &self.index else {
            return Ok(());
        };
        let ids = index.add_documents(documents).await?;
        writeln!(
            out,
            "Successfully pushed docs [{}] into embeddings vector store",
            ids.join(" ")
        )?;
        Ok(())
    }

    /// Directory of the package's first file; package docs are written there
    fn package_dir(&self, first: &str) -> PathBuf {
        match relative_parent(first) {
            ROOT_PACKAGE => self.config.root_path.clone(),
            parent => self.config.root_path.join(Path::new(parent)),
        }
    }
}
