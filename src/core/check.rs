use crate::core::address::url_host;
use crate::domain::model::{CheckDecl, CheckKind, CheckProbe, CheckRegistration};
use crate::utils::duration::format_go_duration;
use url::Url;

/// Turns one check declaration into a check registration.
///
/// Returns `None` when the check's port label is not a number, its interval
/// is zero or the probe URL cannot be formed. An unsupported check type
/// yields a registration without a probe, which the service synthesizer
/// filters out.
pub fn synthesize_check(decl: &CheckDecl, address: &str) -> Option<CheckRegistration> {
    let port: u16 = match decl.port_label.parse() {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(
                check = %decl.name,
                port_label = %decl.port_label,
                error = %e,
                "check port is not a number; dropping check"
            );
            return None;
        }
    };

    if decl.interval.is_zero() {
        tracing::warn!(
            check = %decl.name,
            "check has no polling interval; dropping check"
        );
        return None;
    }

    let probe = match CheckKind::from_tag(&decl.check_type) {
        CheckKind::Http => {
            let url = http_check_url(address, port, &decl.path);
            if let Err(e) = Url::parse(&url) {
                tracing::warn!(check = %decl.name, url = %url, error = %e, "invalid check URL; dropping check");
                return None;
            }
            Some(CheckProbe::Http {
                url,
                method: Some(decl.method.to_uppercase()).filter(|m| !m.is_empty()),
            })
        }
        CheckKind::Unsupported(tag) => {
            tracing::warn!(check = %decl.name, check_type = %tag, "unhandled check type");
            None
        }
    };

    Some(CheckRegistration {
        id: decl.id.clone(),
        name: decl.name.clone(),
        interval: format_go_duration(decl.interval),
        probe,
    })
}

/// `http://<address>:<port><path>`, the port always spelled out.
fn http_check_url(address: &str, port: u16, path: &str) -> String {
    let mut url = format!("http://{}:{}", url_host(address), port);
    if !path.is_empty() && !path.starts_with('/') {
        url.push('/');
    }
    url.push_str(path);
    url
}
