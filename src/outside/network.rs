use std::{
    net::{TcpStream, ToSocketAddrs},
    time::Duration,
};

use tracing::debug;

use crate::result::{Error, Result};

/// Check that `address` ("host:port") accepts a TCP connection within `timeout`
pub fn check_connection(address: &str, timeout: Duration) -> Result<()> {
    let addrs = address
        .to_socket_addrs()
        .map_err(|err| Error::NetworkUnavailable(format!("could not resolve {address}: {err}")))?;

    let mut last_err = None;
    for addr in addrs {
        debug!("Probing {addr}");
        match TcpStream::connect_timeout(&addr, timeout) {
            Ok(_) => return Ok(()),
            Err(err) => last_err = Some(err),
        }
    }

    Err(Error::NetworkUnavailable(match last_err {
        Some(err) => format!("could not reach {address}: {err}"),
        None => format!("no address for {address}"),
    }))
}
