use std::collections::HashSet;

use thiserror::Error;

use crate::gating::CourseContainer;
use crate::model::{ModuleId, SectionId, TestId};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),

    #[error("unknown section: {0}")]
    UnknownSection(SectionId),

    #[error("unknown test: {0}")]
    UnknownTest(TestId),
}

/// Known content ids, used to reject writes against ids that do not exist.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    modules: HashSet<ModuleId>,
    sections: HashSet<SectionId>,
    tests: HashSet<TestId>,
}

impl Catalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers every module of the given courses.
    #[must_use]
    pub fn from_courses<'a>(courses: impl IntoIterator<Item = &'a CourseContainer>) -> Self {
        let mut catalog = Self::new();
        for course in courses {
            catalog
                .modules
                .extend(course.module_ids().into_iter().cloned());
        }
        catalog
    }

    #[must_use]
    pub fn with_modules(mut self, ids: impl IntoIterator<Item = ModuleId>) -> Self {
        self.modules.extend(ids);
        self
    }

    #[must_use]
    pub fn with_sections(mut self, ids: impl IntoIterator<Item = SectionId>) -> Self {
        self.sections.extend(ids);
        self
    }

    #[must_use]
    pub fn with_tests(mut self, ids: impl IntoIterator<Item = TestId>) -> Self {
        self.tests.extend(ids);
        self
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownModule` if the id is not registered.
    pub fn check_module(&self, id: &ModuleId) -> Result<(), CatalogError> {
        if self.modules.contains(id) {
            Ok(())
        } else {
            Err(CatalogError::UnknownModule(id.clone()))
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownSection` if the id is not registered.
    pub fn check_section(&self, id: &SectionId) -> Result<(), CatalogError> {
        if self.sections.contains(id) {
            Ok(())
        } else {
            Err(CatalogError::UnknownSection(id.clone()))
        }
    }

    /// # Errors
    ///
    /// Returns `CatalogError::UnknownTest` if the id is not registered.
    pub fn check_test(&self, id: &TestId) -> Result<(), CatalogError> {
        if self.tests.contains(id) {
            Ok(())
        } else {
            Err(CatalogError::UnknownTest(id.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gating::ModuleOutline;

    #[test]
    fn courses_register_their_modules() {
        let course = CourseContainer::Nested {
            modules: vec![ModuleOutline {
                id: ModuleId::new("tech-m1"),
                order: 1,
                title: String::new(),
                lessons: Vec::new(),
            }],
        };
        let catalog = Catalog::from_courses([&course]);
        assert!(catalog.check_module(&ModuleId::new("tech-m1")).is_ok());
        assert_eq!(
            catalog.check_module(&ModuleId::new("nope")),
            Err(CatalogError::UnknownModule(ModuleId::new("nope")))
        );
    }

    #[test]
    fn sections_and_tests_are_checked_separately() {
        let catalog = Catalog::new()
            .with_sections([SectionId::new("pte-mock-1")])
            .with_tests([TestId::new("tech-weld-1")]);
        assert!(catalog.check_section(&SectionId::new("pte-mock-1")).is_ok());
        assert!(catalog.check_test(&TestId::new("tech-weld-1")).is_ok());
        assert!(catalog.check_test(&TestId::new("pte-mock-1")).is_err());
    }
}
