//! Component generation: locate, copy, install dependencies
//!
//! `generate` runs the same pipeline for the requested component and,
//! recursively, for every sub-component it depends on. There is no
//! memoization across a run: a component reachable through two parents is
//! generated twice, which is harmless because copies overwrite and package
//! installs check for presence first. A component that depends on one of its
//! own ancestors is reported as a cycle and skipped.

use crate::component::ComponentId;
use crate::config::host::HostProject;
use crate::error::{Failure, GenerateError};
use crate::install::{Installer, Toolchain};
use crate::product::ProductConfig;
use crate::report::GenerationReport;
use crate::templates::catalog::{Catalog, DependencyRecord};
use crate::templates::{copy_bundle, locate, CopiedFiles};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub struct Generator<'a, C: ProductConfig> {
    config: &'a C,
    catalog: &'a Catalog,
    template_root: PathBuf,
    host: &'a HostProject,
    toolchain: &'a dyn Toolchain,
}

impl<'a, C: ProductConfig> Generator<'a, C> {
    pub fn new(
        config: &'a C,
        catalog: &'a Catalog,
        template_root: impl Into<PathBuf>,
        host: &'a HostProject,
        toolchain: &'a dyn Toolchain,
    ) -> Self {
        Self {
            config,
            catalog,
            template_root: template_root.into(),
            host,
            toolchain,
        }
    }

    /// Generate `name` and everything it depends on
    ///
    /// Returns an error only when the requested component itself cannot be
    /// generated (unknown name, or its files could not be copied). Failures
    /// of sub-components and package installs are collected in the report;
    /// nothing already written is rolled back.
    pub fn generate(&self, name: &str) -> Result<GenerationReport, GenerateError> {
        let mut ancestors = Vec::new();
        let mut report = self
            .generate_component(name, &mut ancestors)
            .map_err(|failure| failure.error)?;

        if report.wrote_controllers() && self.host.script_resolution.requires_manifest() {
            self.installer().rebuild_manifest(&mut report);
        }

        Ok(report)
    }

    fn generate_component(
        &self,
        name: &str,
        ancestors: &mut Vec<ComponentId>,
    ) -> Result<GenerationReport, Failure> {
        let id = ComponentId::parse(name).map_err(|error| Failure::new(name, error))?;
        let bundle = locate(self.config, &self.template_root, &id)
            .map_err(|error| Failure::new(&id, error))?;

        println!("{}", format!("Generating {} files", id).cyan().bold());
        let files = match copy_bundle(&bundle, &self.host.layout) {
            Ok(files) => files,
            Err(partial) => {
                self.print_created(&partial.copied);
                return Err(Failure::new(&id, partial.error).with_written(partial.copied));
            }
        };
        self.print_created(&files);

        let mut report = GenerationReport::new(id.clone(), files);

        let record = self.catalog.lookup(&id);
        if !record.is_empty() {
            println!("{}", format!("Installing {} dependencies", id).cyan());
            ancestors.push(id);
            self.install_dependencies(record, &mut report, ancestors);
            ancestors.pop();
        }

        Ok(report)
    }

    fn install_dependencies(
        &self,
        record: &DependencyRecord,
        report: &mut GenerationReport,
        ancestors: &mut Vec<ComponentId>,
    ) {
        for name in &record.components {
            if let Ok(id) = ComponentId::parse(name) {
                if ancestors.contains(&id) {
                    let chain = ancestors
                        .iter()
                        .map(ToString::to_string)
                        .chain(std::iter::once(id.to_string()))
                        .collect();
                    report
                        .failures
                        .push(Failure::new(&id, GenerateError::DependencyCycle { chain }));
                    continue;
                }
            }

            match self.generate_component(name, ancestors) {
                Ok(child) => report.dependencies.push(child),
                Err(failure) => {
                    eprintln!("{} {}", "Error:".red(), failure.error);
                    report.failures.push(failure);
                }
            }
        }

        let installer = self.installer();
        installer.install_language_packages(&record.language_packages, report);
        installer.install_script_packages(&record.script_packages, report);
    }

    fn installer(&self) -> Installer<'a> {
        Installer::new(self.toolchain, self.host.script_resolution)
    }

    fn print_created(&self, files: &CopiedFiles) {
        for path in files.all() {
            println!("  {} {}", "create".green(), self.display_path(path));
        }
    }

    fn display_path<'p>(&self, path: &'p Path) -> std::path::Display<'p> {
        path.strip_prefix(&self.host.root).unwrap_or(path).display()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::host::ScriptResolution;
    use crate::install::{ControllerManifest, LanguagePackages, PinConfig, ScriptPackages};
    use crate::product::testing::TestProduct;
    use crate::report::InstallAction;
    use std::cell::RefCell;
    use std::collections::{BTreeMap, BTreeSet};
    use std::fs;
    use tempfile::TempDir;

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Check(String),
        AddGem(String),
        InstallJs(String),
        Pin(String, String),
        Manifest,
    }

    /// In-memory toolchain: records every call, tracks installed gems
    #[derive(Default)]
    struct RecordingToolchain {
        calls: RefCell<Vec<Call>>,
        gems: RefCell<BTreeSet<String>>,
        failing: BTreeSet<String>,
    }

    impl RecordingToolchain {
        fn failing(packages: &[&str]) -> Self {
            Self {
                failing: packages.iter().map(|p| p.to_string()).collect(),
                ..Default::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.borrow().clone()
        }

        fn fail_if_listed(&self, name: &str) -> anyhow::Result<()> {
            if self.failing.contains(name) {
                anyhow::bail!("installer exited with code 1");
            }
            Ok(())
        }
    }

    impl LanguagePackages for RecordingToolchain {
        fn language_package_installed(&self, name: &str) -> anyhow::Result<bool> {
            self.calls.borrow_mut().push(Call::Check(name.to_string()));
            Ok(self.gems.borrow().contains(name))
        }

        fn add_language_package(&self, name: &str) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(Call::AddGem(name.to_string()));
            self.fail_if_listed(name)?;
            if !self.gems.borrow_mut().insert(name.to_string()) {
                anyhow::bail!("duplicate gem declaration: {}", name);
            }
            Ok(())
        }
    }

    impl ScriptPackages for RecordingToolchain {
        fn install_script_package(&self, name: &str) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(Call::InstallJs(name.to_string()));
            self.fail_if_listed(name)
        }
    }

    impl PinConfig for RecordingToolchain {
        fn append_pin(&self, name: &str, url: &str) -> anyhow::Result<()> {
            self.calls
                .borrow_mut()
                .push(Call::Pin(name.to_string(), url.to_string()));
            Ok(())
        }
    }

    impl ControllerManifest for RecordingToolchain {
        fn rebuild_controller_manifest(&self) -> anyhow::Result<()> {
            self.calls.borrow_mut().push(Call::Manifest);
            Ok(())
        }
    }

    /// Template tree plus host project in scratch directories
    struct Fixture {
        templates: TempDir,
        host_dir: TempDir,
        host: HostProject,
    }

    impl Fixture {
        fn new(mode: ScriptResolution) -> Self {
            let templates = TempDir::new().unwrap();
            let host_dir = TempDir::new().unwrap();
            let host = HostProject::detect(host_dir.path(), "test_ui", Some(mode));
            Self {
                templates,
                host_dir,
                host,
            }
        }

        fn template(&self, rel: &str) -> &Self {
            let path = self.templates.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, format!("// {}\n", rel)).unwrap();
            self
        }

        /// Put an empty regular file where a directory is expected
        fn block(&self, rel: &str) {
            let path = self.host_dir.path().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, "").unwrap();
        }

        fn generator<'a>(
            &'a self,
            catalog: &'a Catalog,
            toolchain: &'a RecordingToolchain,
        ) -> Generator<'a, TestProduct> {
            Generator::new(&TestProduct, catalog, self.templates.path(), &self.host, toolchain)
        }

        /// Relative path -> content of every file under the host root
        fn host_files(&self) -> BTreeMap<String, String> {
            walkdir::WalkDir::new(self.host_dir.path())
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
                .map(|e| {
                    let rel = e
                        .path()
                        .strip_prefix(self.host_dir.path())
                        .unwrap()
                        .to_string_lossy()
                        .into_owned();
                    (rel, fs::read_to_string(e.path()).unwrap())
                })
                .collect()
        }
    }

    fn catalog(yaml: &str) -> Catalog {
        Catalog::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_unknown_component_has_no_side_effects() {
        let fx = Fixture::new(ScriptResolution::Yarn);
        let catalog = catalog("ghost:\n  gems: [\"rouge\"]\n  js_packages: [\"motion\"]\n");
        let toolchain = RecordingToolchain::default();

        let err = fx.generator(&catalog, &toolchain).generate("ghost").unwrap_err();

        assert!(matches!(err, GenerateError::ComponentNotFound { .. }));
        assert!(fx.host_files().is_empty());
        assert!(toolchain.calls().is_empty());
    }

    #[test]
    fn test_invalid_name_has_no_side_effects() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("button/button.rb");
        let toolchain = RecordingToolchain::default();

        let err = fx
            .generator(&Catalog::default(), &toolchain)
            .generate("../button")
            .unwrap_err();

        assert!(err.is_not_found());
        assert!(fx.host_files().is_empty());
        assert!(toolchain.calls().is_empty());
    }

    #[test]
    fn test_component_without_dependencies_only_copies() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("button/button.rb");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("button:\n  components: []\n  gems: []\n  js_packages: []\n");

        let report = fx.generator(&catalog, &toolchain).generate("Button").unwrap();

        assert!(report.is_success());
        assert_eq!(report.written_files().len(), 1);
        assert!(report.all_actions().is_empty());
        assert!(toolchain.calls().is_empty());
        assert!(fx
            .host_files()
            .contains_key("app/components/test_ui/button.rb"));
    }

    #[test]
    fn test_language_packages_are_checked_before_adding() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("codeblock/codeblock.rb");
        let toolchain = RecordingToolchain::default();
        toolchain.gems.borrow_mut().insert("rouge".to_string());
        let catalog = catalog("codeblock:\n  gems: [\"rouge\", \"tzinfo\"]\n");

        let report = fx.generator(&catalog, &toolchain).generate("codeblock").unwrap();

        assert!(report.is_success());
        assert_eq!(
            toolchain.calls(),
            vec![
                Call::Check("rouge".into()),
                Call::Check("tzinfo".into()),
                Call::AddGem("tzinfo".into()),
            ]
        );
        assert_eq!(
            report.actions,
            vec![
                InstallAction::LanguagePackagePresent("rouge".into()),
                InstallAction::LanguagePackageAdded("tzinfo".into()),
            ]
        );
    }

    #[test]
    fn test_generating_twice_is_idempotent() {
        let fx = Fixture::new(ScriptResolution::Yarn);
        fx.template("chart/chart.rb")
            .template("chart/chart_legend.rb")
            .template("chart/chart_controller.js");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("chart:\n  gems: [\"groupdate\"]\n  js_packages: [\"chart.js\"]\n");
        let generator = fx.generator(&catalog, &toolchain);

        let first = generator.generate("chart").unwrap();
        let files_after_first = fx.host_files();
        let gems_after_first = toolchain.gems.borrow().clone();
        let second = generator.generate("chart").unwrap();

        assert!(first.is_success());
        assert!(second.is_success());
        assert_eq!(fx.host_files(), files_after_first);
        assert_eq!(*toolchain.gems.borrow(), gems_after_first);
        assert_eq!(
            second.actions,
            vec![
                InstallAction::LanguagePackagePresent("groupdate".into()),
                InstallAction::ScriptPackageInstalled("chart.js".into()),
                InstallAction::ManifestRebuilt,
            ]
        );
    }

    #[test]
    fn test_diamond_dependency_generates_shared_component() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("a/a.rb")
            .template("b/b.rb")
            .template("c/c.rb")
            .template("d/d.rb")
            .template("d/d_controller.js");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog(
            "a:\n  components: [\"B\", \"C\"]\n\
             b:\n  components: [\"D\"]\n\
             c:\n  components: [\"D\"]\n\
             d:\n  gems: [\"shared_gem\"]\n",
        );

        let report = fx.generator(&catalog, &toolchain).generate("a").unwrap();

        assert!(report.is_success());
        let files = fx.host_files();
        assert!(files.contains_key("app/components/test_ui/d.rb"));
        assert!(files.contains_key("app/javascript/controllers/test_ui/d_controller.js"));
        assert!(toolchain.gems.borrow().contains("shared_gem"));

        // Visited through both parents; the second visit finds the gem present
        let adds = toolchain
            .calls()
            .into_iter()
            .filter(|c| *c == Call::AddGem("shared_gem".into()))
            .count();
        assert_eq!(adds, 1);
        assert_eq!(report.dependencies.len(), 2);
    }

    #[test]
    fn test_cdn_packages_skip_standard_installer() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("popover/popover.rb");
        let toolchain = RecordingToolchain::default();
        let catalog =
            catalog("popover:\n  js_packages: [\"tippy.js\", \"motion\", \"@floating-ui/dom\"]\n");

        let report = fx.generator(&catalog, &toolchain).generate("popover").unwrap();

        assert!(report.is_success());
        assert_eq!(
            toolchain.calls(),
            vec![
                Call::Pin(
                    "tippy.js".into(),
                    "https://cdn.jsdelivr.net/npm/tippy.js@6.3.7/+esm".into()
                ),
                Call::Pin(
                    "@popperjs/core".into(),
                    "https://cdn.jsdelivr.net/npm/@popperjs/core@2.11.8/+esm".into()
                ),
                Call::Pin(
                    "motion".into(),
                    "https://cdn.jsdelivr.net/npm/motion@11.11.17/+esm".into()
                ),
                Call::InstallJs("@floating-ui/dom".into()),
            ]
        );
    }

    #[test]
    fn test_cdn_table_only_applies_to_importmap() {
        let fx = Fixture::new(ScriptResolution::Npm);
        fx.template("accordion/accordion.rb");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("accordion:\n  js_packages: [\"motion\"]\n");

        fx.generator(&catalog, &toolchain).generate("accordion").unwrap();

        assert_eq!(toolchain.calls(), vec![Call::InstallJs("motion".into())]);
    }

    #[test]
    fn test_dialog_end_to_end() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("dialog/dialog.rb")
            .template("dialog/dialog_content.rb")
            .template("dialog/dialog_controller.js")
            .template("button/button.rb");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("dialog:\n  components: [\"button\"]\n  js_packages: [\"motion\"]\n");

        let report = fx.generator(&catalog, &toolchain).generate("dialog").unwrap();

        assert!(report.is_success());
        assert!(report.all_failures().is_empty());

        let files = fx.host_files();
        assert_eq!(
            files.keys().cloned().collect::<Vec<_>>(),
            vec![
                "app/components/test_ui/button.rb",
                "app/components/test_ui/dialog.rb",
                "app/components/test_ui/dialog/dialog_content.rb",
                "app/javascript/controllers/test_ui/dialog_controller.js",
            ]
        );
        assert_eq!(
            files["app/components/test_ui/dialog/dialog_content.rb"],
            "// dialog/dialog_content.rb\n"
        );

        assert_eq!(report.dependencies.len(), 1);
        assert_eq!(report.dependencies[0].component.as_str(), "button");
        assert_eq!(
            toolchain.calls(),
            vec![Call::Pin(
                "motion".into(),
                "https://cdn.jsdelivr.net/npm/motion@11.11.17/+esm".into()
            )]
        );
    }

    #[test]
    fn test_missing_sub_component_does_not_stop_siblings() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("date_picker/date_picker.rb")
            .template("calendar/calendar.rb");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog(
            "DatePicker:\n  components: [\"Popover\", \"Calendar\"]\n  gems: [\"chronic\"]\n",
        );

        let report = fx.generator(&catalog, &toolchain).generate("date_picker").unwrap();

        assert!(!report.is_success());
        let failures = report.all_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].component, "popover");
        assert!(failures[0].error.is_not_found());

        assert_eq!(report.dependencies.len(), 1);
        assert!(fx.host_files().contains_key("app/components/test_ui/calendar.rb"));
        assert!(toolchain.gems.borrow().contains("chronic"));
    }

    #[test]
    fn test_installer_failure_is_recorded_and_later_packages_run() {
        let fx = Fixture::new(ScriptResolution::Yarn);
        fx.template("combobox/combobox.rb");
        let toolchain = RecordingToolchain::failing(&["broken-pkg"]);
        let catalog = catalog("combobox:\n  js_packages: [\"broken-pkg\", \"@floating-ui/dom\"]\n");

        let report = fx.generator(&catalog, &toolchain).generate("combobox").unwrap();

        let failures = report.all_failures();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].error.is_warning());
        assert_eq!(failures[0].component, "combobox");
        assert_eq!(
            report.actions,
            vec![InstallAction::ScriptPackageInstalled("@floating-ui/dom".into())]
        );
        assert!(fx.host_files().contains_key("app/components/test_ui/combobox.rb"));
    }

    #[test]
    fn test_manifest_rebuilt_once_per_run() {
        let fx = Fixture::new(ScriptResolution::Yarn);
        fx.template("a/a.rb")
            .template("a/a_controller.js")
            .template("b/b_controller.js");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("a:\n  components: [\"b\"]\n");

        let report = fx.generator(&catalog, &toolchain).generate("a").unwrap();

        assert_eq!(toolchain.calls(), vec![Call::Manifest]);
        assert_eq!(report.actions, vec![InstallAction::ManifestRebuilt]);
    }

    #[test]
    fn test_manifest_skipped_without_controllers_or_with_importmap() {
        let yarn = Fixture::new(ScriptResolution::Yarn);
        yarn.template("separator/separator.rb");
        let toolchain = RecordingToolchain::default();
        yarn.generator(&Catalog::default(), &toolchain)
            .generate("separator")
            .unwrap();
        assert!(toolchain.calls().is_empty());

        let importmap = Fixture::new(ScriptResolution::Importmap);
        importmap.template("tabs/tabs_controller.js");
        let toolchain = RecordingToolchain::default();
        importmap
            .generator(&Catalog::default(), &toolchain)
            .generate("tabs")
            .unwrap();
        assert!(toolchain.calls().is_empty());
    }

    #[test]
    fn test_dependency_cycle_is_reported() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("a/a.rb").template("b/b.rb");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog(
            "a:\n  components: [\"b\"]\n\
             b:\n  components: [\"a\"]\n  gems: [\"g\"]\n",
        );

        let report = fx.generator(&catalog, &toolchain).generate("a").unwrap();

        let failures = report.all_failures();
        assert_eq!(failures.len(), 1);
        match &failures[0].error {
            GenerateError::DependencyCycle { chain } => assert_eq!(chain, &vec!["a", "b", "a"]),
            other => panic!("expected cycle, got {:?}", other),
        }
        // b still gets its own packages
        assert!(toolchain.gems.borrow().contains("g"));
    }

    #[test]
    fn test_sub_component_copy_failure_is_attributed_and_siblings_continue() {
        let fx = Fixture::new(ScriptResolution::Importmap);
        fx.template("a/a.rb")
            .template("b/b.rb")
            .template("b/b_controller.js")
            .template("c/c.rb");
        fx.block("app/javascript/controllers/test_ui");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("a:\n  components: [\"b\", \"c\"]\n  gems: [\"g\"]\n");

        let report = fx.generator(&catalog, &toolchain).generate("a").unwrap();

        let failures = report.all_failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].component, "b");
        assert!(matches!(failures[0].error, GenerateError::Filesystem { .. }));
        assert!(!failures[0].error.is_warning());

        // b's main file landed before the controller copy failed
        let written = failures[0].written.all().collect::<Vec<_>>();
        assert_eq!(written, vec![&fx.host_dir.path().join("app/components/test_ui/b.rb")]);
        assert_eq!(report.written_files().len(), 3);

        assert_eq!(report.dependencies.len(), 1);
        assert_eq!(report.dependencies[0].component.as_str(), "c");
        assert!(fx.host_files().contains_key("app/components/test_ui/c.rb"));
        assert_eq!(report.actions, vec![InstallAction::LanguagePackageAdded("g".into())]);
    }

    #[test]
    fn test_copy_failure_of_requested_component_is_an_error() {
        let fx = Fixture::new(ScriptResolution::Yarn);
        fx.template("tabs/tabs.rb").template("tabs/tabs_controller.js");
        fx.block("app/javascript/controllers/test_ui");
        let toolchain = RecordingToolchain::default();
        let catalog = catalog("tabs:\n  gems: [\"g\"]\n  js_packages: [\"motion\"]\n");

        let err = fx.generator(&catalog, &toolchain).generate("tabs").unwrap_err();

        assert!(matches!(err, GenerateError::Filesystem { .. }));
        assert!(!err.is_not_found());
        assert!(toolchain.calls().is_empty());
        // Nothing is rolled back
        assert!(fx.host_files().contains_key("app/components/test_ui/tabs.rb"));
    }
}
