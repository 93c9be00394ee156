//! Editable site text and imagery.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Site-wide settings. Keys missing from the stored file take their default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct SiteSettings {
    pub hero_image: String,
    pub updated_at: String,
    // Identity (navbar, footer, admin)
    pub site_name: String,
    pub footer_tagline: String,
    // Home page
    pub welcome_subtitle: String,
    pub hero_title_line1: String,
    pub hero_title_line2: String,
    pub hero_tagline: String,
    pub prayer_times_note: String,
    pub footer_quote: String,
    // About page
    pub about_title: String,
    pub about_subtitle: String,
    pub history: String,
    pub imam_message: String,
    // Contact page
    pub contact_title: String,
    pub contact_subtitle: String,
    pub contact_visit_title: String,
    pub contact_details_title: String,
    pub address_line1: String,
    pub address_line2: String,
    pub address_line3: String,
    pub phone: String,
    pub email: String,
    pub contact_footer_note: String,
    /// Stored keys outside the known set, preserved across updates
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            hero_image: String::new(),
            updated_at: String::new(),
            site_name: "Jamiul Azhar Jumma Masjidh".into(),
            footer_tagline: "Serving the community with faith and compassion.".into(),
            welcome_subtitle: "Welcome to".into(),
            hero_title_line1: "Jamiul Azhar".into(),
            hero_title_line2: "Jumma Masjidh".into(),
            hero_tagline: "A house of worship and community at the heart of our neighbourhood."
                .into(),
            prayer_times_note: "Prayer times will be displayed here. Contact the masjid for the current schedule.".into(),
            footer_quote: "May Allah accept our efforts and your support.".into(),
            about_title: "About Us".into(),
            about_subtitle: "Our history and a message from the Imam.".into(),
            history: "Jamiul Azhar Jumma Masjidh was established to serve the local Muslim community. \
Over the years it has grown from a small prayer space into a full masjid with facilities for daily prayers, \
Jumu'ah, and community events.\n\n\
We continue to expand our services and facilities with the support of our donors and volunteers. \
Our goal is to be a welcoming and inclusive place of worship and learning for all."
                .into(),
            imam_message: "Assalamu Alaikum wa Rahmatullahi wa Barakatuhu.\n\n\
Welcome to Jamiul Azhar Jumma Masjidh. Our masjid has been a cornerstone of the community, \
providing a place for prayer, learning, and fellowship. We strive to serve with sincerity and \
to uphold the values of Islam in everything we do.\n\n\
I encourage you to visit, participate in our programs, and support our projects. \
May Allah guide us all and accept our efforts.\n\n\
Jazakallah Khair.\n\
\u{2014} Imam, Jamiul Azhar Jumma Masjidh"
                .into(),
            contact_title: "Contact".into(),
            contact_subtitle: "Get in touch with the masjid.".into(),
            contact_visit_title: "Visit us".into(),
            contact_details_title: "Contact details".into(),
            address_line1: "Jamiul Azhar Jumma Masjidh".into(),
            address_line2: "[Address to be updated]".into(),
            address_line3: "Your City, State \u{2013} PIN".into(),
            phone: "[Phone number to be updated]".into(),
            email: "contact@jajm.example.org".into(),
            contact_footer_note: "For donations, volunteer inquiries, or general questions, please visit \
the masjid office or use the contact details above. Admin login is available for authorised personnel only."
                .into(),
            extra: Map::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_partial_file_takes_defaults() {
        let settings: SiteSettings =
            serde_json::from_value(json!({ "siteName": "Masjid Al-Noor", "phone": "0123" }))
                .unwrap();

        assert_eq!(settings.site_name, "Masjid Al-Noor");
        assert_eq!(settings.phone, "0123");
        assert_eq!(settings.about_title, "About Us");
        assert_eq!(settings.hero_image, "");
    }

    #[test]
    fn test_wire_keys() {
        let json = serde_json::to_value(SiteSettings::default()).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 24);
        for key in ["heroTitleLine1", "addressLine3", "imamMessage", "updatedAt"] {
            assert!(obj.contains_key(key), "missing {}", key);
        }
        assert!(json["history"].as_str().unwrap().contains("\n\nWe continue"));
    }

    #[test]
    fn test_unknown_stored_keys_round_trip() {
        let settings: SiteSettings =
            serde_json::from_value(json!({ "siteName": "Masjid", "donationLink": "https://give" }))
                .unwrap();
        assert_eq!(settings.extra["donationLink"], "https://give");

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["donationLink"], "https://give");
        assert_eq!(json.as_object().unwrap().len(), 25);
    }
}
