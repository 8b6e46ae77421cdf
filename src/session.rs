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
use reqwest::blocking::Client as HttpClient;
use reqwest::StatusCode;
use tracing::debug;
use xmltree::{Element, XMLNode};

use crate::model::{Scheme, Sensor};
use crate::network::Endpoint;
use crate::IpmiError;

/// The substring of the login response that marks a successful login. The
/// CGI always answers 200, so the body is the only success signal.
const LOGIN_OK_MARKER: &str = "mainmenu";

/// A session against the web interface of one BMC.
///
/// Holds the host/credential pair, the active URI scheme and the login
/// state. Login happens lazily: the first operation probes whether the
/// device redirects plain HTTP to HTTPS, then posts the login form and
/// keeps the session cookie for all later requests. There is no logout,
/// the device expires the cookie on its own.
///
/// Every call performs blocking network I/O. A session is bound to one
/// device; use one session per BMC and do not share it across threads.
pub struct IpmiSession {
    endpoint: Endpoint,
    http_client: HttpClient,
    scheme: Scheme,
    authenticated: bool,
    probed: bool,
}

impl IpmiSession {
    pub(crate) fn new(http_client: HttpClient, endpoint: Endpoint) -> IpmiSession {
        IpmiSession {
            endpoint,
            http_client,
            scheme: Scheme::Http,
            authenticated: false,
            probed: false,
        }
    }

    /// Hostname or IP address this session talks to
    pub fn host(&self) -> &str {
        &self.endpoint.host
    }

    /// The scheme currently in use. Starts as `Http`, upgraded to `Https`
    /// at first use if the device redirects.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Whether the login form has been accepted already
    pub fn is_logged_in(&self) -> bool {
        self.authenticated
    }

    /// Logs in if this session is not authenticated yet.
    ///
    /// Performs no network I/O once authenticated. On a rejected login the
    /// session stays unauthenticated, so a later call retries.
    pub fn ensure_logged_in(&mut self) -> Result<(), IpmiError> {
        if self.authenticated {
            return Ok(());
        }
        if !self.probed {
            self.resolve_scheme()?;
            self.probed = true;
        }
        self.login()
    }

    /// Current power draw in watts.
    ///
    /// Firmware generations disagree on where this lives. The main power
    /// consumption query reports a peak register and, on newer firmware, an
    /// averaged instantaneous value which takes precedence. If neither
    /// yields a non-zero reading, fall back to the power sensor query,
    /// which encodes watts as hex. Devices without any power meter report 0.
    pub fn get_power_consumption(&mut self) -> Result<u32, IpmiError> {
        self.ensure_logged_in()?;
        let mut watts = 0;
        if let Some(doc) = self.ipmi_request("POWER_CONSUMPTION.XML", "(0,0)")? {
            watts = consumption_watts(&doc);
        }
        if watts == 0 {
            if let Some(doc) = self.ipmi_request("Get_PowerSnrReading.XML", "(0,0)")? {
                watts = snr_watts(&doc);
            }
        }
        Ok(watts)
    }

    /// All sensors the device reports, in document order.
    ///
    /// Firmware that does not support the sensor query answers with
    /// garbage instead of XML; that comes back as an empty list.
    pub fn get_sensors(&mut self) -> Result<Vec<Sensor>, IpmiError> {
        self.ensure_logged_in()?;
        match self.ipmi_request("SENSOR_INFO.XML", "(1,ff)")? {
            Some(doc) => Ok(sensors(&doc)),
            None => Ok(Vec::new()),
        }
    }

    /// Is this thing even on?
    pub fn get_power_status(&mut self) -> Result<bool, IpmiError> {
        Ok(self.power_info_request(0, 0)? == "ON")
    }

    /// Powers the machine on
    pub fn power_on(&mut self) -> Result<(), IpmiError> {
        self.power_info_request(1, 1).map(|_status| ())
    }

    /// Powers the machine off immediately, without a graceful OS shutdown
    pub fn power_off(&mut self) -> Result<(), IpmiError> {
        self.power_info_request(1, 0).map(|_status| ())
    }

    /// Restarts the machine
    pub fn power_restart(&mut self) -> Result<(), IpmiError> {
        self.power_info_request(1, 3).map(|_status| ())
    }

    // GET / with redirect following off. Exactly 301 means the device wants
    // HTTPS; anything else (including errors the device answers itself)
    // keeps plain HTTP. Runs at most once per session.
    fn resolve_scheme(&mut self) -> Result<(), IpmiError> {
        let url = format!("{}/", self.base_url());
        debug!("TX GET {url}");
        let response = self
            .http_client
            .get(&url)
            .send()
            .map_err(|e| IpmiError::NetworkError { url, source: e })?;
        debug!("RX {}", response.status());
        if response.status() == StatusCode::MOVED_PERMANENTLY {
            self.scheme = Scheme::Https;
        }
        Ok(())
    }

    fn login(&mut self) -> Result<(), IpmiError> {
        let url = format!("{}/cgi/login.cgi", self.base_url());
        let form = [
            ("name", self.endpoint.user.as_str()),
            ("pwd", self.endpoint.password.as_str()),
        ];
        debug!("TX POST {url} name={}", self.endpoint.user);
        let response = self
            .http_client
            .post(&url)
            .form(&form)
            .send()
            .map_err(|e| IpmiError::NetworkError {
                url: url.clone(),
                source: e,
            })?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| IpmiError::NetworkError { url, source: e })?;
        debug!("RX {status} ({} bytes)", body.len());
        if body.contains(LOGIN_OK_MARKER) {
            self.authenticated = true;
            Ok(())
        } else {
            Err(IpmiError::Unauthorized {
                host: self.endpoint.host.clone(),
            })
        }
    }

    // One round-trip to the CGI endpoint every query and command goes
    // through. `None` means the device did not answer with XML, which some
    // firmware does for queries it does not support. Callers treat that as
    // "feature unsupported" and fall back, never as a failure.
    fn ipmi_request(&self, op: &str, range: &str) -> Result<Option<Element>, IpmiError> {
        let url = format!("{}/cgi/ipmi.cgi", self.base_url());
        let params = request_params(op, range, current_time_stamp());
        debug!("TX POST {url} op={op} r={range}");
        let response = self
            .http_client
            .post(&url)
            .form(&params)
            .send()
            .map_err(|e| IpmiError::NetworkError {
                url: url.clone(),
                source: e,
            })?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| IpmiError::NetworkError { url, source: e })?;
        debug!("RX {status} {body}");
        Ok(Element::parse(body.as_bytes()).ok())
    }

    // Power status and power control share one request shape: mode 0 reads,
    // mode 1 writes with the action in the second parameter. The device
    // reports the (new) state either way; a document without it has no
    // fallback.
    fn power_info_request(&mut self, p1: u8, p2: u8) -> Result<String, IpmiError> {
        self.ensure_logged_in()?;
        let range = format!("({p1},{p2})");
        let doc = self.ipmi_request("POWER_INFO.XML", &range)?;
        doc.as_ref()
            .and_then(|doc| power_status(doc))
            .map(str::to_owned)
            .ok_or_else(|| IpmiError::UnexpectedValue {
                url: format!("{}/cgi/ipmi.cgi", self.base_url()),
                reason: "unable to fetch power status".to_owned(),
            })
    }

    fn base_url(&self) -> String {
        match self.endpoint.port {
            Some(port) => format!("{}://{}:{}", self.scheme, self.endpoint.host, port),
            None => format!("{}://{}", self.scheme, self.endpoint.host),
        }
    }
}

// Both parameter schemas in one body: older firmware only reads the
// `<op>=<range>` key, newer firmware only `op`/`r`. Sending both is free and
// saves detecting the firmware generation. The time stamp is cosmetic but
// the CGI expects the field to be present.
fn request_params(op: &str, range: &str, time_stamp: String) -> Vec<(String, String)> {
    vec![
        (op.to_owned(), range.to_owned()),
        ("op".to_owned(), op.to_owned()),
        ("r".to_owned(), range.to_owned()),
        ("time_stamp".to_owned(), time_stamp),
        ("_".to_owned(), String::new()),
    ]
}

// Browser-style date string, e.g. `Mon Sep 09 2019 16:29:09 GMT+0200`.
fn current_time_stamp() -> String {
    chrono::Local::now()
        .format("%a %b %d %Y %H:%M:%S GMT%z")
        .to_string()
}

// `PEAK.Current` and `NOW.AVR` are both decimal; NOW.AVR wins when both are
// present. Keep that precedence, it matches what the device firmware
// actually populates.
fn consumption_watts(doc: &Element) -> u32 {
    let mut watts = 0;
    if let Some(peak) = find_attr(doc, "PEAK", "Current") {
        watts = peak.trim().parse().unwrap_or(0);
    }
    if let Some(avr) = find_attr(doc, "NOW", "AVR") {
        watts = avr.trim().parse().unwrap_or(0);
    }
    watts
}

// The power sensor query encodes watts as a hex string, unlike the decimal
// values of the consumption query.
fn snr_watts(doc: &Element) -> u32 {
    match find_attr(doc, "PowerSnr", "PWR_Consumption") {
        Some(hex) => u32::from_str_radix(hex.trim(), 16).unwrap_or(0),
        None => 0,
    }
}

fn power_status(doc: &Element) -> Option<&str> {
    find_element(doc, "POWER_INFO").and_then(|info| find_attr(info, "POWER", "STATUS"))
}

fn sensors(doc: &Element) -> Vec<Sensor> {
    let mut out = Vec::new();
    if let Some(info) = find_element(doc, "SENSOR_INFO") {
        collect_sensors(info, &mut out);
    }
    out
}

fn collect_sensors(element: &Element, out: &mut Vec<Sensor>) {
    for child in element.children.iter().filter_map(XMLNode::as_element) {
        if child.name == "SENSOR" {
            out.push(Sensor::from_element(child));
        }
        collect_sensors(child, out);
    }
}

// The response nesting differs between firmware generations, so all lookups
// search the whole subtree for the named element rather than a fixed path.
fn find_element<'a>(element: &'a Element, name: &str) -> Option<&'a Element> {
    if element.name == name {
        return Some(element);
    }
    element
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .find_map(|child| find_element(child, name))
}

fn find_attr<'a>(element: &'a Element, name: &str, attr: &str) -> Option<&'a str> {
    if element.name == name {
        if let Some(value) = element.attributes.get(attr) {
            return Some(value.as_str());
        }
    }
    element
        .children
        .iter()
        .filter_map(XMLNode::as_element)
        .find_map(|child| find_attr(child, name, attr))
}
