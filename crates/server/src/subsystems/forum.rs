use services::{ServiceReply, ServiceRequest, SimpleDispatcher};
use shared::protocol::VersionDetails;

struct Release {
    number: &'static str,
    name: &'static str,
    lts: bool,
    active: bool,
    current: bool,
    dev: bool,
}

const RELEASES: &[Release] = &[
    Release {
        number: "20.04",
        name: "Focal Fossa",
        lts: true,
        active: true,
        current: false,
        dev: false,
    },
    Release {
        number: "22.04",
        name: "Jammy Jellyfish",
        lts: true,
        active: true,
        current: false,
        dev: false,
    },
    Release {
        number: "24.04",
        name: "Noble Numbat",
        lts: true,
        active: true,
        current: true,
        dev: false,
    },
    Release {
        number: "24.10",
        name: "Oracular Oriole",
        lts: false,
        active: false,
        current: false,
        dev: false,
    },
    Release {
        number: "25.04",
        name: "Plucky Puffin",
        lts: false,
        active: true,
        current: false,
        dev: false,
    },
    Release {
        number: "25.10",
        name: "Questing Quokka",
        lts: false,
        active: true,
        current: false,
        dev: true,
    },
];

pub fn dispatcher() -> SimpleDispatcher {
    SimpleDispatcher::new().register("get_version_details", |req: ServiceRequest| async move {
        match req.query("version").and_then(version_details) {
            Some(details) => ServiceReply::json(&details),
            None => Ok(ServiceReply::Value(serde_json::json!({}))),
        }
    })
}

pub fn version_details(number: &str) -> Option<VersionDetails> {
    RELEASES
        .iter()
        .find(|release| release.number == number)
        .map(|release| VersionDetails {
            number: release.number.to_string(),
            name: release.name.to_string(),
            lts: release.lts,
            active: release.active,
            current: release.current,
            dev: release.dev,
            link: release_link(release.name),
        })
}

fn release_link(name: &str) -> String {
    format!("https://wiki.ubuntuusers.de/{}/", name.replace(' ', "_"))
}
