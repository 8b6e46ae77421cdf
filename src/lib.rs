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

//! Client for the IPMI-over-HTTP web interface exposed by Supermicro-style
//! baseboard management controllers.
//!
//! These BMCs are driven the way a browser drives them: a cookie login form
//! at `/cgi/login.cgi` followed by XML-producing requests to
//! `/cgi/ipmi.cgi`. [`IpmiSession`] wraps one host/credential pair, logs in
//! lazily on first use (probing whether the device redirects HTTP to
//! HTTPS), and exposes power consumption, sensor telemetry and power
//! control. All calls are blocking network I/O.
//!
//! ```no_run
//! use ipmiweb::{Endpoint, IpmiClientPool};
//!
//! # fn main() -> Result<(), ipmiweb::IpmiError> {
//! let pool = IpmiClientPool::builder().build();
//! let mut session = pool.create_session(Endpoint {
//!     host: "10.0.0.42".to_string(),
//!     user: "ADMIN".to_string(),
//!     password: "ADMIN".to_string(),
//!     ..Default::default()
//! })?;
//!
//! println!("power draw: {} W", session.get_power_consumption()?);
//! for sensor in session.get_sensors()? {
//!     println!("{:?}", sensor);
//! }
//! if !session.get_power_status()? {
//!     session.power_on()?;
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod model;
mod network;
mod session;

pub use error::IpmiError;
pub use model::{Scheme, Sensor};
pub use network::{Endpoint, IpmiClientPool, IpmiClientPoolBuilder};
pub use session::IpmiSession;
