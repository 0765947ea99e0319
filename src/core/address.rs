use crate::config::BridgeConfig;
use crate::utils::error::{BridgeError, Result};
use std::net::{IpAddr, Ipv6Addr};

/// One address bound to one network interface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub name: String,
    pub ip: IpAddr,
    pub up: bool,
}

/// Determines the address this host is advertised under.
///
/// `--iface` wins, then an explicit address (flag or `LOCAL_SERVICE_ADDRESS`),
/// then the first usable non-loopback address of any interface that is up.
pub fn resolve_address(config: &BridgeConfig) -> Result<String> {
    if config.iface.is_none() {
        if let Some(address) = explicit_address(config) {
            return Ok(address);
        }
    }

    let interfaces = interface_addrs().map_err(|e| BridgeError::AddressError {
        message: format!("listing network interfaces: {}", e),
    })?;
    resolve_from(config, &interfaces)
}

/// Same resolution order as [`resolve_address`] over a fixed interface list.
pub fn resolve_from(config: &BridgeConfig, interfaces: &[InterfaceAddr]) -> Result<String> {
    if let Some(iface) = config.iface.as_deref() {
        let ip = address_of_interface(iface, interfaces)?;
        tracing::debug!(iface, address = %ip, "using interface address");
        return Ok(ip.to_string());
    }

    if let Some(address) = explicit_address(config) {
        return Ok(address);
    }

    let ip = default_address(interfaces).ok_or_else(|| BridgeError::AddressError {
        message: "no non-loopback address found on any interface".to_string(),
    })?;
    tracing::debug!(address = %ip, "using detected address");
    Ok(ip.to_string())
}

fn explicit_address(config: &BridgeConfig) -> Option<String> {
    config
        .address
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string)
}

fn address_of_interface(iface: &str, interfaces: &[InterfaceAddr]) -> Result<IpAddr> {
    let mut candidates = interfaces.iter().filter(|i| i.name == iface).peekable();
    if candidates.peek().is_none() {
        return Err(BridgeError::AddressError {
            message: format!("interface {} not found", iface),
        });
    }

    let (v4, v6): (Vec<IpAddr>, Vec<IpAddr>) =
        candidates.map(|i| i.ip).partition(|ip| ip.is_ipv4());
    v4.into_iter()
        .next()
        .or_else(|| v6.into_iter().next())
        .ok_or_else(|| BridgeError::AddressError {
            message: format!("interface {} has no address", iface),
        })
}

fn default_address(interfaces: &[InterfaceAddr]) -> Option<IpAddr> {
    let usable = || interfaces.iter().filter(|i| i.up && !i.ip.is_loopback());

    usable()
        .map(|i| i.ip)
        .find(|ip| ip.is_ipv4() && !ip.is_unspecified())
        .or_else(|| {
            usable().map(|i| i.ip).find(|ip| match ip {
                IpAddr::V6(v6) => !v6.is_unspecified() && !is_link_local_v6(v6),
                IpAddr::V4(_) => false,
            })
        })
}

fn is_link_local_v6(ip: &Ipv6Addr) -> bool {
    (ip.segments()[0] & 0xffc0) == 0xfe80
}

/// Renders an address as a URL host, bracketing IPv6 literals.
pub fn url_host(address: &str) -> String {
    match address.parse::<Ipv6Addr>() {
        Ok(_) => format!("[{}]", address),
        Err(_) => address.to_string(),
    }
}

#[cfg(unix)]
pub fn interface_addrs() -> std::io::Result<Vec<InterfaceAddr>> {
    use std::ffi::CStr;
    use std::net::Ipv4Addr;

    let mut head: *mut libc::ifaddrs = std::ptr::null_mut();
    if unsafe { libc::getifaddrs(&mut head) } != 0 {
        return Err(std::io::Error::last_os_error());
    }

    let mut out = Vec::new();
    let mut cursor = head;
    while !cursor.is_null() {
        // SAFETY: cursor walks the list returned by getifaddrs, freed below.
        let entry = unsafe { &*cursor };
        cursor = entry.ifa_next;
        if entry.ifa_addr.is_null() || entry.ifa_name.is_null() {
            continue;
        }

        let family = unsafe { (*entry.ifa_addr).sa_family } as libc::c_int;
        let ip = match family {
            libc::AF_INET => {
                let sin = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in) };
                IpAddr::V4(Ipv4Addr::from(u32::from_be(sin.sin_addr.s_addr)))
            }
            libc::AF_INET6 => {
                let sin6 = unsafe { &*(entry.ifa_addr as *const libc::sockaddr_in6) };
                IpAddr::V6(Ipv6Addr::from(sin6.sin6_addr.s6_addr))
            }
            _ => continue,
        };
        let name = unsafe { CStr::from_ptr(entry.ifa_name) }
            .to_string_lossy()
            .into_owned();
        let up = entry.ifa_flags & (libc::IFF_UP as libc::c_uint) != 0;

        out.push(InterfaceAddr { name, ip, up });
    }

    unsafe { libc::freeifaddrs(head) };
    Ok(out)
}

#[cfg(not(unix))]
pub fn interface_addrs() -> std::io::Result<Vec<InterfaceAddr>> {
    Err(std::io::Error::new(
        std::io::ErrorKind::Unsupported,
        "interface enumeration is only available on unix; pass --address",
    ))
}
