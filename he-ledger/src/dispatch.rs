//! Transaction entry points: `init` once, then `invoke` with a function name followed by
//! byte-string arguments.

use crate::config::LedgerConfig;
use crate::errors::LedgerError;
use crate::report::manager::ReportManager;
use crate::store::ReportStore;

pub const CREATE_REPORT: &str = "CreateReport";
pub const REPLACE_REPORT: &str = "ReplaceReport";
pub const SUBMIT_DATA: &str = "SubmitData";
pub const QUERY_DATA: &str = "QueryData";

#[derive(Debug, Clone)]
pub struct Ledger {
    manager: ReportManager,
}

impl Ledger {
    /// Resolves the configured profile and binds the report manager to it.
    pub fn init(config: &LedgerConfig) -> Result<Self, LedgerError> {
        let profile = config.resolve_profile()?;
        log::info!("Ledger initialised with profile {}", profile.name());

        Ok(Self {
            manager: ReportManager::new(profile),
        })
    }

    pub fn manager(&self) -> &ReportManager {
        &self.manager
    }

    /// Runs one transaction. `args[0]` names the function; the payload is empty for every
    /// function except `QueryData`, which returns the marshalled sum ciphertext.
    pub fn invoke<S, A>(&self, store: &mut S, args: &[A]) -> Result<Vec<u8>, LedgerError>
    where
        S: ReportStore + ?Sized,
        A: AsRef<[u8]>,
    {
        let Some((function, args)) = args.split_first() else {
            return Err(LedgerError::UnknownFunction(String::new()));
        };
        let function = String::from_utf8_lossy(function.as_ref());

        let result = match function.as_ref() {
            CREATE_REPORT => check_args(args, 2).and_then(|_| {
                let subject = text("subject", args[0].as_ref())?;
                self.manager
                    .create_report(store, subject, args[1].as_ref())
                    .map(|_| Vec::new())
            }),
            REPLACE_REPORT => check_args(args, 2).and_then(|_| {
                let subject = text("subject", args[0].as_ref())?;
                self.manager
                    .replace_report(store, subject, args[1].as_ref())
                    .map(|_| Vec::new())
            }),
            SUBMIT_DATA => check_args(args, 3).and_then(|_| {
                let subject = text("subject", args[0].as_ref())?;
                let contributor = text("contributor id", args[1].as_ref())?;
                self.manager
                    .submit_data(store, subject, contributor, args[2].as_ref())
                    .map(|_| Vec::new())
            }),
            QUERY_DATA => check_args(args, 1).and_then(|_| {
                let subject = text("subject", args[0].as_ref())?;
                self.manager.query_data(store, subject)
            }),
            other => Err(LedgerError::UnknownFunction(other.to_string())),
        };

        if let Err(err) = &result {
            log::warn!("{} failed: {}", function, err);
        }

        result
    }
}

fn check_args<A>(args: &[A], expected: usize) -> Result<(), LedgerError> {
    if args.len() != expected {
        return Err(LedgerError::ArgumentCountError {
            expected,
            actual: args.len(),
        });
    }
    Ok(())
}

/// Subjects and contributor ids are store keys, so they must round-trip exactly.
fn text<'a>(what: &str, arg: &'a [u8]) -> Result<&'a str, LedgerError> {
    std::str::from_utf8(arg)
        .map_err(|e| LedgerError::DecodeError(format!("{} is not valid UTF-8: {}", what, e)))
}
