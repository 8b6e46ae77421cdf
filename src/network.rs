/*
 * SPDX-License-Identifier: MIT
 *
 * Permission is hereby granted, free of charge, to any person obtaining a
 * copy of this software and associated documentation files (the "Software"),
 * to deal in the Software without restriction, including without limitation
 * the rights to use, copy, modify, merge, publish, distribute, sublicense,
 * and/or sell copies of the Software, and to permit persons to whom the
 * Software is furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in
 * all copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL
 * THE AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING
 * FROM, OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER
 * DEALINGS IN THE SOFTWARE.
 */
use std::time::Duration;

use reqwest::blocking::ClientBuilder as HttpClientBuilder;
use reqwest::redirect::Policy;

use crate::session::IpmiSession;
pub use crate::IpmiError;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug)]
pub struct IpmiClientPoolBuilder {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl IpmiClientPoolBuilder {
    /// Prevents sessions from accepting self signed certificates
    /// and other invalid certificates.
    ///
    /// By default self signed certificates will be accepted, since BMCs
    /// usually use those.
    pub fn reject_invalid_certs(mut self) -> IpmiClientPoolBuilder {
        self.accept_invalid_certs = false;
        self
    }

    /// Overwrites the timeout that will be applied to every request
    pub fn timeout(mut self, timeout: Duration) -> IpmiClientPoolBuilder {
        self.timeout = timeout;
        self
    }

    /// Builds the session factory with this network configuration
    pub fn build(&self) -> IpmiClientPool {
        IpmiClientPool {
            timeout: self.timeout,
            accept_invalid_certs: self.accept_invalid_certs,
        }
    }
}

/// The endpoint that a session connects to
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Endpoint {
    /// Hostname or IP address of the BMC
    pub host: String,
    /// BMC web interface port. If absent the scheme default (80/443) is used
    pub port: Option<u16>,
    /// BMC username
    pub user: String,
    /// BMC password
    pub password: String,
}

/// Factory for [`IpmiSession`]s sharing one network configuration.
#[derive(Debug, Clone)]
pub struct IpmiClientPool {
    timeout: Duration,
    accept_invalid_certs: bool,
}

impl IpmiClientPool {
    /// Returns a builder for configuring timeouts and TLS verification
    pub fn builder() -> IpmiClientPoolBuilder {
        IpmiClientPoolBuilder {
            timeout: DEFAULT_TIMEOUT,
            // BMCs often have a self-signed cert, so usually this has to be true
            accept_invalid_certs: true,
        }
    }

    /// Creates a session for one BMC endpoint.
    ///
    /// Each session owns its own HTTP client, so login cookies never leak
    /// between devices. Redirect following is disabled on the whole client:
    /// the scheme probe must see the 301 itself, and no CGI endpoint
    /// redirects.
    pub fn create_session(&self, endpoint: Endpoint) -> Result<IpmiSession, IpmiError> {
        let http_client = HttpClientBuilder::new()
            .danger_accept_invalid_certs(self.accept_invalid_certs)
            .timeout(self.timeout)
            .cookie_store(true)
            .redirect(Policy::none())
            .build()
            .map_err(IpmiError::ClientBuild)?;
        Ok(IpmiSession::new(http_client, endpoint))
    }
}
