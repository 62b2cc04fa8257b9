//! Shared fixtures for the core integration tests

#![allow(dead_code)]

use fhirgate_core::{FhirOptions, FhirServices, FhirVersion};

pub const VALID_PATIENT: &str = r#"{
    "resourceType": "Patient",
    "id": "example-patient-1",
    "meta": {
        "versionId": "1",
        "lastUpdated": "2024-01-15T10:30:00Z"
    },
    "identifier": [
        {
            "system": "http://hospital.example.org/patients",
            "value": "12345"
        }
    ],
    "active": true,
    "name": [
        {
            "use": "official",
            "family": "Smith",
            "given": ["John", "William"]
        }
    ],
    "telecom": [
        {
            "system": "phone",
            "value": "+1-555-555-1234",
            "use": "home"
        },
        {
            "system": "email",
            "value": "john.smith@example.com"
        }
    ],
    "gender": "male",
    "birthDate": "1990-05-15",
    "address": [
        {
            "use": "home",
            "line": ["123 Main Street", "Apt 4B"],
            "city": "Boston",
            "state": "MA",
            "postalCode": "02101",
            "country": "USA"
        }
    ]
}"#;

pub const MINIMAL_PATIENT: &str = r#"{
    "resourceType": "Patient",
    "id": "minimal-patient"
}"#;

pub const VALID_OBSERVATION: &str = r#"{
    "resourceType": "Observation",
    "id": "blood-pressure-1",
    "meta": {
        "versionId": "1",
        "lastUpdated": "2024-01-15T14:30:00Z"
    },
    "status": "final",
    "category": [
        {
            "coding": [
                {
                    "system": "http://terminology.hl7.org/CodeSystem/observation-category",
                    "code": "vital-signs",
                    "display": "Vital Signs"
                }
            ]
        }
    ],
    "code": {
        "coding": [
            {
                "system": "http://loinc.org",
                "code": "85354-9",
                "display": "Blood pressure panel"
            }
        ],
        "text": "Blood Pressure"
    },
    "subject": {
        "reference": "Patient/example-patient-1",
        "display": "John Smith"
    },
    "effectiveDateTime": "2024-01-15T14:00:00Z",
    "component": [
        {
            "code": {
                "coding": [
                    {
                        "system": "http://loinc.org",
                        "code": "8480-6",
                        "display": "Systolic blood pressure"
                    }
                ]
            },
            "valueQuantity": {
                "value": 120,
                "unit": "mmHg",
                "system": "http://unitsofmeasure.org",
                "code": "mm[Hg]"
            }
        },
        {
            "code": {
                "coding": [
                    {
                        "system": "http://loinc.org",
                        "code": "8462-4",
                        "display": "Diastolic blood pressure"
                    }
                ]
            },
            "valueQuantity": {
                "value": 80,
                "unit": "mmHg",
                "system": "http://unitsofmeasure.org",
                "code": "mm[Hg]"
            }
        }
    ]
}"#;

pub const VALID_CONDITION: &str = r#"{
    "resourceType": "Condition",
    "id": "condition-1",
    "clinicalStatus": {
        "coding": [
            {
                "system": "http://terminology.hl7.org/CodeSystem/condition-clinical",
                "code": "active"
            }
        ]
    },
    "code": {
        "coding": [
            {
                "system": "http://snomed.info/sct",
                "code": "73211009",
                "display": "Diabetes mellitus"
            }
        ],
        "text": "Diabetes mellitus"
    },
    "subject": {
        "reference": "Patient/example-patient-1"
    },
    "onsetDateTime": "2020-06-15"
}"#;

pub const VALID_BUNDLE: &str = r#"{
    "resourceType": "Bundle",
    "id": "bundle-example",
    "type": "collection",
    "entry": [
        {
            "resource": {
                "resourceType": "Patient",
                "id": "patient-in-bundle",
                "name": [
                    {
                        "family": "Doe",
                        "given": ["Jane"]
                    }
                ]
            }
        }
    ]
}"#;

pub const PATIENT_MISSING_TYPE: &str = r#"{
    "id": "invalid-patient",
    "name": [
        {
            "family": "Invalid"
        }
    ]
}"#;

pub const PATIENT_WRONG_TYPE: &str = r#"{
    "resourceType": "Patient",
    "id": "invalid-patient",
    "birthDate": "not-a-date"
}"#;

pub const MALFORMED_JSON: &str = r#"{
    "resourceType": "Patient",
    "id": "malformed"
    "name": [
}"#;

pub const XML_PATIENT: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Patient xmlns="http://hl7.org/fhir">
  <id value="xml-patient"/>
  <active value="true"/>
  <name>
    <use value="official"/>
    <family value="Jones"/>
    <given value="Mary"/>
  </name>
  <gender value="female"/>
  <birthDate value="1985-03-22"/>
</Patient>"#;

pub fn services() -> FhirServices {
    services_with(FhirOptions::default())
}

pub fn services_for(version: FhirVersion) -> FhirServices {
    services_with(FhirOptions {
        version,
        ..FhirOptions::default()
    })
}

pub fn services_with(options: FhirOptions) -> FhirServices {
    FhirServices::new(options).expect("engine bindings for every version")
}
