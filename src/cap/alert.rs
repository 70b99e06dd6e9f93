//! CAP alert documents.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::schema::{cap_vocabulary, Circle, Fields, FromNode, LanguageTag, ValidationError};

cap_vocabulary! {
    Status, "status" {
        Actual => "Actual",
        Test => "Test",
        Exercise => "Exercise",
        Draft => "Draft",
        System => "System",
    }
}

cap_vocabulary! {
    MsgType, "message type" {
        Alert => "Alert",
        Cancel => "Cancel",
        Update => "Update",
        Ack => "Ack",
        Error => "Error",
    }
}

cap_vocabulary! {
    Scope, "scope" {
        Public => "Public",
        Restricted => "Restricted",
        Private => "Private",
    }
}

cap_vocabulary! {
    /// Handling codes seen in the alert hub feed.
    Code, "code" {
        EcMscSmc10 => "layer:EC-MSC-SMC:1.0",
        EcMscSmc11 => "layer:EC-MSC-SMC:1.1",
        Sorem10 => "layer:SOREM:1.0",
        Sorem20 => "layer:SOREM:2.0",
        CapCp04 => "profile:CAP-CP:0.4",
        Blank => "",
        Ipaws10 => "IPAWSv1.0",
    }
}

cap_vocabulary! {
    Category, "category" {
        Geo => "Geo",
        Met => "Met",
        Safety => "Safety",
        Security => "Security",
        Rescue => "Rescue",
        Fire => "Fire",
        Health => "Health",
        Env => "Env",
        Transport => "Transport",
        Infra => "Infra",
        Cbrne => "CBRNE",
        Other => "Other",
    }
}

cap_vocabulary! {
    ResponseType, "response type" {
        Blank => "",
        Shelter => "Shelter",
        Evacuate => "Evacuate",
        Prepare => "Prepare",
        Execute => "Execute",
        Avoid => "Avoid",
        Monitor => "Monitor",
        Assess => "Assess",
        AllClear => "AllClear",
        None => "None",
    }
}

cap_vocabulary! {
    Urgency, "urgency" {
        Expected => "Expected",
        Future => "Future",
        Immediate => "Immediate",
        Past => "Past",
        Unknown => "Unknown",
    }
}

cap_vocabulary! {
    Severity, "severity" {
        Minor => "Minor",
        Moderate => "Moderate",
        Severe => "Severe",
        Unknown => "Unknown",
        Extreme => "Extreme",
    }
}

cap_vocabulary! {
    Certainty, "certainty" {
        Likely => "Likely",
        Observed => "Observed",
        Possible => "Possible",
        Unknown => "Unknown",
        /// Deprecated in CAP 1.1 but still published by some senders.
        VeryLikely => "Very Likely",
    }
}

/// `valueName`/`value` pair used by `parameter`, `eventCode` and `geocode`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    pub value_name: String,
    pub value: String,
}

impl FromNode for Parameter {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Parameter {
            value_name: fields.required("valueName")?,
            value: fields.required("value")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Area {
    pub area_desc: String,
    pub polygons: Vec<String>,
    pub geocodes: Vec<Parameter>,
    pub altitude: Option<f64>,
    pub ceiling: Option<f64>,
    pub circle: Option<Circle>,
}

impl FromNode for Area {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Area {
            area_desc: fields.required("areaDesc")?,
            polygons: fields.optional_many("polygon")?,
            geocodes: fields.optional_many("geocode")?,
            altitude: fields.optional("altitude")?,
            ceiling: fields.optional("ceiling")?,
            circle: fields.optional("circle")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Info {
    pub languages: Vec<LanguageTag>,
    pub category: Category,
    pub event: String,
    pub response_type: Option<ResponseType>,
    pub urgency: Urgency,
    pub severity: Severity,
    pub certainty: Certainty,
    pub audience: Option<String>,
    pub event_codes: Vec<Parameter>,
    pub effective: Option<DateTime<Utc>>,
    pub onset: Option<DateTime<Utc>>,
    pub expires: Option<DateTime<Utc>>,
    pub sender_name: Option<String>,
    pub headline: Option<String>,
    pub description: String,
    pub instruction: Option<String>,
    pub web: Option<String>,
    pub contact: Option<String>,
    pub parameters: Vec<Parameter>,
    pub areas: Vec<Area>,
}

impl FromNode for Info {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Info {
            languages: fields.optional_many("language")?,
            category: fields.required("category")?,
            event: fields.required("event")?,
            response_type: fields.optional("responseType")?,
            urgency: fields.required("urgency")?,
            severity: fields.required("severity")?,
            certainty: fields.required("certainty")?,
            audience: fields.optional("audience")?,
            event_codes: fields.optional_many("eventCode")?,
            effective: fields.optional("effective")?,
            onset: fields.optional("onset")?,
            expires: fields.optional("expires")?,
            sender_name: fields.optional("senderName")?,
            headline: fields.optional("headline")?,
            description: fields.required("description")?,
            instruction: fields.optional("instruction")?,
            web: fields.optional("web")?,
            contact: fields.optional("contact")?,
            parameters: fields.optional_many("parameter")?,
            areas: fields.many("area")?,
        })
    }
}

/// XML-DSig envelope attached by some senders. Only its shape is checked; the
/// signature itself is not verified.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signature {
    pub signed_info: SignedInfo,
    pub signature_value: String,
    pub key_info: KeyInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignedInfo {
    pub canonicalization_method: String,
    pub signature_method: String,
    pub reference: Reference,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reference {
    pub transform: String,
    pub digest_method: String,
    pub digest_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeyInfo {
    pub x509_certificate: String,
}

impl FromNode for Signature {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Signature {
            signed_info: fields.required("SignedInfo")?,
            signature_value: fields.required("SignatureValue")?,
            key_info: fields.required("KeyInfo")?,
        })
    }
}

impl FromNode for SignedInfo {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(SignedInfo {
            canonicalization_method: fields.required("CanonicalizationMethod")?,
            signature_method: fields.required("SignatureMethod")?,
            reference: fields.required("Reference")?,
        })
    }
}

impl FromNode for Reference {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Reference {
            transform: fields.nested("Transforms", |transforms| transforms.required("Transform"))?,
            digest_method: fields.required("DigestMethod")?,
            digest_value: fields.required("DigestValue")?,
        })
    }
}

impl FromNode for KeyInfo {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(KeyInfo {
            x509_certificate: fields.nested("X509Data", |data| data.required("X509Certificate"))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub identifier: String,
    pub sender: String,
    pub sent: DateTime<Utc>,
    pub status: Status,
    pub msg_type: MsgType,
    pub source: Option<String>,
    pub scope: Scope,
    pub references: Option<String>,
    pub codes: Vec<Code>,
    pub note: Option<String>,
    pub restriction: Option<String>,
    pub addresses: Option<String>,
    pub incidents: Option<String>,
    pub signatures: Vec<Signature>,
    pub info: Vec<Info>,
}

impl FromNode for Alert {
    fn from_node(node: &Value, path: &str) -> Result<Self, ValidationError> {
        let fields = Fields::new(node, path)?;
        Ok(Alert {
            identifier: fields.required("identifier")?,
            sender: fields.required("sender")?,
            sent: fields.required("sent")?,
            status: fields.required("status")?,
            msg_type: fields.required("msgType")?,
            source: fields.optional("source")?,
            scope: fields.required("scope")?,
            references: fields.optional("references")?,
            codes: fields.optional_many("code")?,
            note: fields.optional("note")?,
            restriction: fields.optional("restriction")?,
            addresses: fields.optional("addresses")?,
            incidents: fields.optional("incidents")?,
            signatures: fields.optional_many("Signature")?,
            info: fields.many("info")?,
        })
    }
}

/// Validates a parsed CAP document (`{"alert": {...}}`) into an [`Alert`].
pub fn validate_alert_document(document: &Value) -> Result<Alert, ValidationError> {
    Fields::new(document, "")?.required("alert")
}
