//! OS resolution.

use rigger_core::{Error, Os, Result};

/// Pick the OS a playbook runs against.
///
/// A single declared OS is always chosen. With several, `user` must name one of them.
pub fn resolve_os<'a>(oses: &'a [Os], user: &str) -> Result<&'a Os> {
    match oses {
        [] => Err(Error::UnknownOs(user.to_string())),
        [only] => Ok(only),
        many if user.is_empty() => Err(Error::UnknownOs(format!(
            "no user given to choose between {} oses",
            many.len()
        ))),
        many => many
            .iter()
            .find(|os| os.user == user)
            .ok_or_else(|| Error::UnknownOs(user.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rigger_core::ErrorKind;

    fn os(user: &str) -> Os {
        Os {
            user: user.into(),
            python_interpreter: format!("/home/{user}/bin/python"),
        }
    }

    #[test]
    fn test_single_os_always_selected() {
        let oses = [os("core")];
        for user in ["", "core", "ops"] {
            assert_eq!(resolve_os(&oses, user).unwrap().user, "core");
        }
    }

    #[test]
    fn test_multiple_oses_match_user() {
        let oses = [os("core"), os("ops")];
        let selected = resolve_os(&oses, "ops").unwrap();
        assert_eq!(selected.user, "ops");
        assert_eq!(selected.python_interpreter, "/home/ops/bin/python");

        let err = resolve_os(&oses, "").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Resolution);
        assert!(matches!(resolve_os(&oses, "root"), Err(Error::UnknownOs(u)) if u == "root"));
    }

    #[test]
    fn test_no_oses() {
        assert!(matches!(resolve_os(&[], "core"), Err(Error::UnknownOs(_))));
    }
}
