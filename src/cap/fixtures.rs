//! XML documents shared by the unit tests.

pub const POLYGON_A: &str = "45.0,-122.0 46.0,-122.0 46.0,-121.0 45.0,-122.0";
pub const POLYGON_B: &str = "38.5,-90.1 38.9,-90.1 38.9,-89.6 38.5,-90.1";

/// One `<info>` block with the given category and `<area>` body.
pub fn info_xml(category: &str, area_body: &str) -> String {
    format!(
        r#"<info>
    <language>en-US</language>
    <category>{category}</category>
    <event>Flood Warning</event>
    <responseType>Prepare</responseType>
    <urgency>Expected</urgency>
    <severity>Moderate</severity>
    <certainty>Likely</certainty>
    <eventCode><valueName>SAME</valueName><value>FLW</value></eventCode>
    <effective>2024-03-01T12:30:00-04:00</effective>
    <expires>2024-03-02T12:30:00-04:00</expires>
    <senderName>NWS Portland OR</senderName>
    <headline>Flood Warning issued March 1</headline>
    <description>The river is expected to rise above flood stage.</description>
    <instruction>Move to higher ground.</instruction>
    <parameter><valueName>VTEC</valueName><value>/O.NEW.KPQR.FL.W.0001.240301T1630Z/</value></parameter>
    <parameter><valueName>WMOidentifier</valueName><value>WGUS46 KPQR 011630</value></parameter>
    <area>
      {area_body}
    </area>
  </info>"#
    )
}

pub fn polygon_area(polygon: &str) -> String {
    format!(
        "<areaDesc>Clackamas County</areaDesc><polygon>{}</polygon><geocode><valueName>UGC</valueName><value>ORC005</value></geocode>",
        polygon
    )
}

/// A complete CAP 1.2 document wrapping the given `<info>` blocks.
pub fn alert_xml(infos: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<alert xmlns="urn:oasis:names:tc:emergency:cap:1.2">
  <identifier>urn:oid:2.49.0.1.840.0.0001</identifier>
  <sender>w-nws.webmaster@noaa.gov</sender>
  <sent>2024-03-01T12:30:00-04:00</sent>
  <status>Actual</status>
  <msgType>Alert</msgType>
  <source>NWS</source>
  <scope>Public</scope>
  <code>IPAWSv1.0</code>
  {}
</alert>"#,
        infos.join("\n  ")
    )
}

/// A single-info alert with one polygon area.
pub fn simple_alert(category: &str, polygon: &str) -> String {
    alert_xml(&[info_xml(category, &polygon_area(polygon))])
}

/// An RSS index whose items link to the given URLs.
pub fn rss_xml(links: &[String]) -> String {
    let items: Vec<String> = links
        .iter()
        .enumerate()
        .map(|(index, link)| {
            format!(
                r#"<item>
      <title>Alert {index}</title>
      <link>{link}</link>
      <description>Test alert {index}</description>
      <pubDate>Fri, 01 Mar 2024 16:30:00 GMT</pubDate>
      <updated>2024-03-01T16:30:00Z</updated>
      <relLink>alerts/{index}.xml</relLink>
      <sourceFeed>https://alerts.example.org/feed</sourceFeed>
      <alertId>alert-{index}</alertId>
      <copyright>public domain</copyright>
      <isoPubDate>2024-03-01T16:30:00Z</isoPubDate>
      <preservationCopy>https://archive.example.org/{index}.xml</preservationCopy>
    </item>"#
            )
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<?xml-stylesheet href="rss.xsl" type="text/xsl"?>
<rss version="2.0" xmlns:atom="http://www.w3.org/2005/Atom">
  <channel>
    <link>https://cap-alerts.example.org</link>
    <atom:link href="https://cap-alerts.example.org/rss.xml" rel="self" type="application/rss+xml"/>
    <title>Unfiltered CAP alerts</title>
    <description>All alerts</description>
    <language>en</language>
    <copyright>public domain</copyright>
    <pubDate>Fri, 01 Mar 2024 16:30:00 GMT</pubDate>
    <docs>https://www.rssboard.org/rss-specification</docs>
    <image>
      <title>CAP alerts</title>
      <url>https://cap-alerts.example.org/logo.png</url>
      <link>https://cap-alerts.example.org</link>
    </image>
    <ccfeedver>1.0</ccfeedver>
    <lastBuildDate>Fri, 01 Mar 2024 16:31:00 GMT</lastBuildDate>
    {}
  </channel>
</rss>"#,
        items.join("\n    ")
    )
}
