use crate::core::check::synthesize_check;
use crate::core::identifier::IdGenerator;
use crate::domain::model::{ServiceDecl, ServiceRegistration};

/// Turns one service declaration into a registration, or `None` when its
/// port label is not a number. Only checks with an executable probe are kept.
pub fn synthesize_service(
    decl: &ServiceDecl,
    address: &str,
    ids: &mut IdGenerator,
) -> Option<ServiceRegistration> {
    let port: u16 = match decl.port_label.parse() {
        Ok(port) => port,
        Err(e) => {
            tracing::warn!(
                service = %decl.name,
                port_label = %decl.port_label,
                error = %e,
                "service port label is not a number; skipping service"
            );
            return None;
        }
    };

    let checks = decl
        .checks
        .iter()
        .filter_map(|c| synthesize_check(c, address))
        .filter(|c| c.is_executable())
        .collect();

    Some(ServiceRegistration {
        id: ids.service_id(&decl.name),
        name: decl.name.clone(),
        tags: decl.tags.clone(),
        port,
        address: address.to_string(),
        checks,
    })
}
