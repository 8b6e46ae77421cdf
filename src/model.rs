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
use std::fmt;

use indexmap::IndexMap;
use xmltree::Element;

/// URI scheme a session uses to reach the BMC. Sessions start on `Http`
/// and switch to `Https` once if the redirect probe sees a 301.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scheme {
    Http,
    Https,
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        })
    }
}

/// One sensor row as reported by the device.
///
/// The attribute set varies by firmware generation (`id`, `value`, `status`,
/// `unit`, ...), so this is an open string-keyed bag rather than a fixed
/// struct. Values are kept verbatim apart from trimming surrounding
/// whitespace; iteration order is the order the attributes appeared in the
/// document.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Sensor {
    attributes: IndexMap<String, String>,
}

impl Sensor {
    pub(crate) fn from_element(element: &Element) -> Sensor {
        let attributes = element
            .attributes
            .iter()
            .map(|(name, value)| (name.clone(), value.trim().to_owned()))
            .collect();
        Sensor { attributes }
    }

    /// Value of one attribute, if the firmware reported it.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// All attributes in document order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sensor_keeps_document_order_and_trims() {
        let element = Element::parse(
            r#"<SENSOR ID="1" NAME=" CPU Temp " READING=" 52 " UNIT="degrees C"/>"#.as_bytes(),
        )
        .unwrap();
        let sensor = Sensor::from_element(&element);
        assert_eq!(sensor.len(), 4);
        assert_eq!(sensor.get("NAME"), Some("CPU Temp"));
        assert_eq!(sensor.get("READING"), Some("52"));
        assert_eq!(sensor.get("MISSING"), None);
        let names: Vec<&str> = sensor.attributes().map(|(name, _)| name).collect();
        assert_eq!(names, ["ID", "NAME", "READING", "UNIT"]);
    }

    #[test]
    fn scheme_display() {
        assert_eq!(Scheme::Http.to_string(), "http");
        assert_eq!(Scheme::Https.to_string(), "https");
    }
}
