//! Update eligibility classification
//!
//! This module provides:
//! - The `UpdateChecker` capability trait the per-ecosystem checker implements
//! - Pre-filters for unmanageable, up-to-date, and ignored dependencies
//! - The unlock-scope decision table
//! - Candidate construction for everything that survives
//! - A catalog-backed concrete checker for file-supplied version sets

mod catalog;

pub use catalog::{CatalogChecker, CatalogCheckerFactory, VersionCatalog};

use crate::domain::{
    Dependency, DependencyUpdate, EligibilityDecision, SkipReason, SkippedDependency, UnlockScope,
    UpdateCandidate,
};
use colored::Colorize;

/// Per-dependency capability object supplied by the ecosystem integration
///
/// Injected as a strategy at construction; the classifier itself never talks
/// to registries or files.
pub trait UpdateChecker {
    /// The dependency this checker was built for
    fn dependency(&self) -> &Dependency;

    /// Returns true when no newer selectable version exists
    fn up_to_date(&self) -> bool;

    /// Returns true when requirements are already unlocked or can be unlocked
    fn requirements_unlocked_or_can_be(&self) -> bool;

    /// Returns true when an update is possible with the given unlock scope
    fn can_update(&self, scope: UnlockScope) -> bool;

    /// The updates applying this dependency's upgrade would produce
    fn updated_dependencies(&self, scope: UnlockScope) -> Vec<DependencyUpdate>;
}

/// Builds one `UpdateChecker` per dependency
pub trait CheckerFactory {
    /// Create a checker for the dependency
    fn checker_for(&self, dependency: &Dependency) -> Box<dyn UpdateChecker>;
}

/// Classifies dependencies into the minimal unlock scope their update needs
pub struct EligibilityClassifier {
    /// Names excluded from this run; matched exactly
    ignore_list: Vec<String>,
    /// Whether skip lines are printed
    quiet: bool,
}

/// What happened to one dependency during selection
pub enum Selection {
    /// The dependency is updatable and yielded a candidate
    Candidate(UpdateCandidate),
    /// The dependency was skipped before or during classification
    Skipped(SkippedDependency),
}

impl EligibilityClassifier {
    /// Creates a classifier with the given ignore list
    pub fn new(ignore_list: Vec<String>) -> Self {
        Self {
            ignore_list,
            quiet: false,
        }
    }

    /// Suppress informational skip lines (builder pattern)
    pub fn quiet(mut self) -> Self {
        self.quiet = true;
        self
    }

    /// Apply the decision table to a checker
    ///
    /// Rows are evaluated in order; the first match wins:
    ///
    /// | unlocked-or-can-be | none | own | all | decision   |
    /// |--------------------|------|-----|-----|------------|
    /// | false              | yes  |  -  |  -  | none       |
    /// | false              | no   |  -  |  -  | impossible |
    /// | true               |  -   | yes |  -  | own        |
    /// | true               |  -   | no  | yes | all        |
    /// | true               |  -   | no  | no  | impossible |
    pub fn classify(&self, checker: &dyn UpdateChecker) -> EligibilityDecision {
        if !checker.requirements_unlocked_or_can_be() {
            if checker.can_update(UnlockScope::None) {
                EligibilityDecision::None
            } else {
                EligibilityDecision::Impossible
            }
        } else if checker.can_update(UnlockScope::Own) {
            EligibilityDecision::Own
        } else if checker.can_update(UnlockScope::All) {
            EligibilityDecision::All
        } else {
            EligibilityDecision::Impossible
        }
    }

    /// Run pre-filters and classification for one dependency
    ///
    /// The factory is only consulted for dependencies that pass the static
    /// pre-filters; unmanageable dependencies never construct a checker.
    pub fn select(&self, dependency: &Dependency, factory: &dyn CheckerFactory) -> Selection {
        if let Some(reason) = self.prefilter(dependency) {
            return self.skip(dependency, reason);
        }

        let checker = factory.checker_for(dependency);

        if checker.up_to_date() {
            self.log(&format!(
                "{} (version {}) - up to date",
                dependency.name,
                dependency.version.as_deref().unwrap_or("?")
            ));
            return self.skip(dependency, SkipReason::UpToDate);
        }

        if self.ignore_list.iter().any(|n| n == &dependency.name) {
            return self.skip(dependency, SkipReason::Ignored);
        }

        let decision = self.classify(checker.as_ref());
        let Some(scope) = decision.unlock_scope() else {
            return self.skip(dependency, SkipReason::UpdateNotPossible);
        };

        let updated = checker.updated_dependencies(scope);
        let primary = updated
            .iter()
            .find(|u| dependency.name_matches(&u.name))
            .cloned();

        match primary {
            Some(primary) => Selection::Candidate(UpdateCandidate::new(primary, updated, scope)),
            // A checker that reports updatable but yields no update for the
            // requested name cannot be applied.
            None => self.skip(dependency, SkipReason::UpdateNotPossible),
        }
    }

    /// Static pre-filters that run before any checker is built
    fn prefilter(&self, dependency: &Dependency) -> Option<SkipReason> {
        if !dependency.top_level {
            // Transitive dependencies ride along with a primary update.
            return Some(SkipReason::UpdateNotPossible);
        }
        if dependency.version.is_none() {
            return Some(SkipReason::ManagedInSubmodule);
        }
        if dependency.externally_managed() {
            return Some(SkipReason::ManagedExternally);
        }
        None
    }

    fn skip(&self, dependency: &Dependency, reason: SkipReason) -> Selection {
        self.log(&format!("__ {} - {}", dependency.name, reason));
        Selection::Skipped(SkippedDependency::new(
            &dependency.name,
            dependency.version.clone(),
            reason,
        ))
    }

    fn log(&self, line: &str) {
        if !self.quiet {
            println!("{}", line.dimmed());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scripted checker covering each row of the decision table
    struct FakeChecker {
        dependency: Dependency,
        up_to_date: bool,
        unlocked: bool,
        can_none: bool,
        can_own: bool,
        can_all: bool,
        updates: Vec<DependencyUpdate>,
    }

    impl FakeChecker {
        fn updatable(name: &str) -> Self {
            Self {
                dependency: Dependency::new(name, "2.9.0"),
                up_to_date: false,
                unlocked: true,
                can_none: false,
                can_own: true,
                can_all: false,
                updates: vec![DependencyUpdate::new(name, "3.0.0", "2.9.0")],
            }
        }
    }

    impl UpdateChecker for FakeChecker {
        fn dependency(&self) -> &Dependency {
            &self.dependency
        }
        fn up_to_date(&self) -> bool {
            self.up_to_date
        }
        fn requirements_unlocked_or_can_be(&self) -> bool {
            self.unlocked
        }
        fn can_update(&self, scope: UnlockScope) -> bool {
            match scope {
                UnlockScope::None => self.can_none,
                UnlockScope::Own => self.can_own,
                UnlockScope::All => self.can_all,
            }
        }
        fn updated_dependencies(&self, _scope: UnlockScope) -> Vec<DependencyUpdate> {
            self.updates.clone()
        }
    }

    struct FakeFactory(std::cell::RefCell<Vec<FakeChecker>>);

    impl CheckerFactory for FakeFactory {
        fn checker_for(&self, _dependency: &Dependency) -> Box<dyn UpdateChecker> {
            Box::new(self.0.borrow_mut().remove(0))
        }
    }

    fn classifier() -> EligibilityClassifier {
        EligibilityClassifier::new(Vec::new()).quiet()
    }

    fn table_checker(unlocked: bool, can_none: bool, can_own: bool, can_all: bool) -> FakeChecker {
        FakeChecker {
            unlocked,
            can_none,
            can_own,
            can_all,
            ..FakeChecker::updatable("Pkg")
        }
    }

    #[test]
    fn test_decision_table_locked_but_updatable_in_place() {
        let checker = table_checker(false, true, false, false);
        assert_eq!(classifier().classify(&checker), EligibilityDecision::None);
    }

    #[test]
    fn test_decision_table_locked_and_stuck() {
        let checker = table_checker(false, false, true, true);
        assert_eq!(
            classifier().classify(&checker),
            EligibilityDecision::Impossible
        );
    }

    #[test]
    fn test_decision_table_own_unlock() {
        let checker = table_checker(true, false, true, false);
        assert_eq!(classifier().classify(&checker), EligibilityDecision::Own);
    }

    #[test]
    fn test_decision_table_all_unlock() {
        let checker = table_checker(true, false, false, true);
        assert_eq!(classifier().classify(&checker), EligibilityDecision::All);
    }

    #[test]
    fn test_decision_table_unlocked_but_stuck() {
        let checker = table_checker(true, false, false, false);
        assert_eq!(
            classifier().classify(&checker),
            EligibilityDecision::Impossible
        );
    }

    #[test]
    fn test_select_produces_candidate_with_primary() {
        let factory = FakeFactory(std::cell::RefCell::new(vec![
            FakeChecker::updatable("Sentry")
        ]));
        let dep = Dependency::new("Sentry", "2.9.0");
        match classifier().select(&dep, &factory) {
            Selection::Candidate(candidate) => {
                assert_eq!(candidate.primary.name, "Sentry");
                assert_eq!(candidate.scope, UnlockScope::Own);
                assert_eq!(candidate.version_postfix(), "3.0.0/2.9.0");
            }
            Selection::Skipped(_) => panic!("expected candidate"),
        }
    }

    #[test]
    fn test_select_primary_matched_case_insensitively() {
        let mut checker = FakeChecker::updatable("Sentry");
        checker.updates = vec![
            DependencyUpdate::new("sentry", "3.0.0", "2.9.0"),
            DependencyUpdate::new("Sentry.Protocol", "3.0.0", "2.9.0").transitive(),
        ];
        let factory = FakeFactory(std::cell::RefCell::new(vec![checker]));
        let dep = Dependency::new("Sentry", "2.9.0");
        match classifier().select(&dep, &factory) {
            Selection::Candidate(candidate) => {
                assert_eq!(candidate.primary.name, "sentry");
                assert_eq!(candidate.updated.len(), 2);
            }
            Selection::Skipped(_) => panic!("expected candidate"),
        }
    }

    #[test]
    fn test_select_skips_unversioned() {
        let factory = FakeFactory(std::cell::RefCell::new(Vec::new()));
        let dep = Dependency::unversioned("Some.Submodule");
        match classifier().select(&dep, &factory) {
            Selection::Skipped(skip) => assert_eq!(skip.reason, SkipReason::ManagedInSubmodule),
            Selection::Candidate(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_select_skips_externally_managed() {
        let factory = FakeFactory(std::cell::RefCell::new(Vec::new()));
        let dep = Dependency::new("Sentry", "$(SentryVersion)");
        match classifier().select(&dep, &factory) {
            Selection::Skipped(skip) => assert_eq!(skip.reason, SkipReason::ManagedExternally),
            Selection::Candidate(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_select_skips_up_to_date() {
        let mut checker = FakeChecker::updatable("Sentry");
        checker.up_to_date = true;
        let factory = FakeFactory(std::cell::RefCell::new(vec![checker]));
        let dep = Dependency::new("Sentry", "3.0.0");
        match classifier().select(&dep, &factory) {
            Selection::Skipped(skip) => assert_eq!(skip.reason, SkipReason::UpToDate),
            Selection::Candidate(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_select_skips_ignored_names() {
        let factory = FakeFactory(std::cell::RefCell::new(vec![
            FakeChecker::updatable("Sentry")
        ]));
        let classifier = EligibilityClassifier::new(vec!["Sentry".to_string()]).quiet();
        let dep = Dependency::new("Sentry", "2.9.0");
        match classifier.select(&dep, &factory) {
            Selection::Skipped(skip) => assert_eq!(skip.reason, SkipReason::Ignored),
            Selection::Candidate(_) => panic!("expected skip"),
        }
    }

    #[test]
    fn test_ignore_list_is_exact_match() {
        let factory = FakeFactory(std::cell::RefCell::new(vec![
            FakeChecker::updatable("Sentry.AspNetCore"),
        ]));
        let classifier = EligibilityClassifier::new(vec!["Sentry".to_string()]).quiet();
        let dep = Dependency::new("Sentry.AspNetCore", "2.9.0");
        assert!(matches!(
            classifier.select(&dep, &factory),
            Selection::Candidate(_)
        ));
    }

    #[test]
    fn test_select_drops_impossible() {
        let checker = table_checker(true, false, false, false);
        let factory = FakeFactory(std::cell::RefCell::new(vec![checker]));
        let dep = Dependency::new("Pkg", "2.9.0");
        match classifier().select(&dep, &factory) {
            Selection::Skipped(skip) => {
                assert_eq!(skip.reason, SkipReason::UpdateNotPossible)
            }
            Selection::Candidate(_) => panic!("expected skip"),
        }
    }
}
