use std::path::PathBuf;

use log::{info, warn};
use pyparity_error::{ParityError, Result};
use pyparity_interp::Interpreter;
use pyparity_reflect::{
    Implementation, Listing, ReflectOptions, Reflection, identify_implementation, is_importable,
    reflect,
};

use crate::differ::diff;
use crate::report::{Report, Unavailable, header_name};
use crate::store::{BaselineStore, Verdict};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleVerdict {
    pub module: String,
    pub verdict: Verdict,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckSummary {
    pub verdicts: Vec<ModuleVerdict>,
    /// Known-absent modules the subject now imports.
    pub newly_importable: Vec<String>,
}

impl CheckSummary {
    pub fn passed(&self) -> bool {
        self.newly_importable.is_empty() && self.verdicts.iter().all(|v| v.verdict.passed())
    }
}

/// Reflects modules under a reference and a subject interpreter and
/// reports what the subject lacks or has in excess.
pub struct ModuleDiff<'a> {
    reference: &'a Interpreter,
    subject: &'a Interpreter,
    store: BaselineStore,
    options: ReflectOptions,
    impl_name: Option<String>,
}

impl<'a> ModuleDiff<'a> {
    pub fn new(reference: &'a Interpreter, subject: &'a Interpreter, store: BaselineStore) -> Self {
        Self {
            reference,
            subject,
            store,
            options: ReflectOptions::default(),
            impl_name: None,
        }
    }

    pub fn with_options(mut self, options: ReflectOptions) -> Self {
        self.options = options;
        self
    }

    /// Name used for the subject in report headers instead of its
    /// `sys.implementation.name`. Folded by [`header_name`].
    pub fn with_impl_name(mut self, name: &str) -> Self {
        self.impl_name = Some(header_name(name));
        self
    }

    pub fn store(&self) -> &BaselineStore {
        &self.store
    }

    /// Identifies both sides; an interpreter that cannot be started is named
    /// after its program with an unknown version.
    fn implementations(&self) -> Result<(Implementation, Implementation)> {
        let reference = identify_or_fallback(self.reference)?;
        let mut subject = identify_or_fallback(self.subject)?;
        if let Some(name) = &self.impl_name {
            subject.name = name.clone();
        }
        Ok((reference, subject))
    }

    pub fn report(&self, module: &str) -> Result<Report> {
        let (reference, subject) = self.implementations()?;
        self.build_report(module, &reference, &subject)
    }

    fn build_report(
        &self,
        module: &str,
        reference_impl: &Implementation,
        subject_impl: &Implementation,
    ) -> Result<Report> {
        info!("processing {module}");
        let mut unavailable = Vec::new();
        let mut side = |interpreter: &Interpreter, label: &str| -> Result<Listing> {
            match reflect(interpreter, module, &self.options)? {
                Reflection::Listed(listing) => Ok(listing),
                Reflection::Unavailable { reason } => {
                    warn!("{module} could not be reflected by {label}: {reason}");
                    unavailable.push(Unavailable::new(label, &reason));
                    Ok(Listing::default())
                }
            }
        };
        let reference = side(self.reference, &reference_impl.name)?;
        let subject = side(self.subject, &subject_impl.name)?;

        Ok(Report {
            module: module.to_string(),
            implementation: subject_impl.clone(),
            unavailable,
            delta: diff(&subject, &reference),
        })
    }

    /// Regenerates the baselines of `modules`. Every report is computed
    /// before the first file is written.
    pub fn generate<S: AsRef<str>>(&self, modules: &[S]) -> Result<Vec<PathBuf>> {
        let (reference, subject) = self.implementations()?;
        let reports = modules
            .iter()
            .map(|module| self.build_report(module.as_ref(), &reference, &subject))
            .collect::<Result<Vec<_>>>()?;
        self.store.write_all(&reports)
    }

    /// Checks `modules` against their baselines and imports each of `absent` to find
    /// modules the subject has started to provide.
    pub fn check<S: AsRef<str>, T: AsRef<str>>(
        &self,
        modules: &[S],
        absent: &[T],
    ) -> Result<CheckSummary> {
        let (reference, subject) = self.implementations()?;
        let mut summary = CheckSummary::default();
        for module in modules {
            let module = module.as_ref();
            let report = self.build_report(module, &reference, &subject)?;
            let verdict = self.store.check(&report)?;
            match &verdict {
                Verdict::Matches => info!("{module}: matches baseline"),
                Verdict::Differs { .. } => warn!("{module}: differs from baseline"),
                Verdict::Missing => warn!(
                    "{module}: no baseline at {}",
                    self.store.path_for(module).display()
                ),
            }
            summary.verdicts.push(ModuleVerdict {
                module: module.to_string(),
                verdict,
            });
        }
        for module in absent {
            let module = module.as_ref();
            if is_importable(self.subject, module)? {
                warn!("{module} is now importable under {}", self.subject.display_name());
                summary.newly_importable.push(module.to_string());
            }
        }
        Ok(summary)
    }
}

fn identify_or_fallback(interpreter: &Interpreter) -> Result<Implementation> {
    match identify_implementation(interpreter) {
        Ok(implementation) => Ok(Implementation {
            name: header_name(&implementation.name),
            ..implementation
        }),
        Err(err @ ParityError::Spawn { .. }) => {
            warn!("{err}");
            let name = interpreter
                .program()
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_default();
            Ok(Implementation {
                name: header_name(&name),
                version: "unknown".to_string(),
            })
        }
        Err(err) => Err(err),
    }
}
