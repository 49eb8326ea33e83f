//! Glue between a text field and the system auto-fill service.

use super::input_filter::TextInputType;

/// What a field holds, as declared by the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContentType {
    /// Nothing declared.
    #[default]
    Unspecified,
    /// Account name.
    UserName,
    /// Existing password.
    Password,
    /// Password being created.
    NewPassword,
    /// Full street address.
    FullStreetAddress,
    /// House number.
    HouseNumber,
    /// District.
    DistrictAddress,
    /// City.
    CityAddress,
    /// Province.
    ProvinceAddress,
    /// Country.
    CountryAddress,
    /// Full person name.
    PersonFullName,
    /// Family name.
    PersonLastName,
    /// Given name.
    PersonFirstName,
    /// Phone number without country code.
    PhoneNumber,
    /// Phone country code.
    PhoneCountryCode,
    /// Phone number with country code.
    FullPhoneNumber,
    /// E-mail address.
    EmailAddress,
    /// Bank card number.
    BankCardNumber,
    /// Identity card number.
    IdCardNumber,
    /// Nickname.
    Nickname,
}

/// Auto-fill category sent to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AutoFillType {
    /// Not eligible for auto-fill.
    #[default]
    Unspecified,
    /// Account name.
    UserName,
    /// Existing password.
    Password,
    /// Password being created.
    NewPassword,
    /// Full street address.
    FullStreetAddress,
    /// House number.
    HouseNumber,
    /// District.
    DistrictAddress,
    /// City.
    CityAddress,
    /// Province.
    ProvinceAddress,
    /// Country.
    CountryAddress,
    /// Full person name.
    PersonFullName,
    /// Family name.
    PersonLastName,
    /// Given name.
    PersonFirstName,
    /// Phone number without country code.
    PhoneNumber,
    /// Phone country code.
    PhoneCountryCode,
    /// Phone number with country code.
    FullPhoneNumber,
    /// E-mail address.
    EmailAddress,
    /// Bank card number.
    BankCardNumber,
    /// Identity card number.
    IdCardNumber,
    /// Nickname.
    Nickname,
}

impl From<ContentType> for AutoFillType {
    fn from(value: ContentType) -> Self {
        match value {
            ContentType::Unspecified => Self::Unspecified,
            ContentType::UserName => Self::UserName,
            ContentType::Password => Self::Password,
            ContentType::NewPassword => Self::NewPassword,
            ContentType::FullStreetAddress => Self::FullStreetAddress,
            ContentType::HouseNumber => Self::HouseNumber,
            ContentType::DistrictAddress => Self::DistrictAddress,
            ContentType::CityAddress => Self::CityAddress,
            ContentType::ProvinceAddress => Self::ProvinceAddress,
            ContentType::CountryAddress => Self::CountryAddress,
            ContentType::PersonFullName => Self::PersonFullName,
            ContentType::PersonLastName => Self::PersonLastName,
            ContentType::PersonFirstName => Self::PersonFirstName,
            ContentType::PhoneNumber => Self::PhoneNumber,
            ContentType::PhoneCountryCode => Self::PhoneCountryCode,
            ContentType::FullPhoneNumber => Self::FullPhoneNumber,
            ContentType::EmailAddress => Self::EmailAddress,
            ContentType::BankCardNumber => Self::BankCardNumber,
            ContentType::IdCardNumber => Self::IdCardNumber,
            ContentType::Nickname => Self::Nickname,
        }
    }
}

impl AutoFillType {
    /// Resolves the fill type of a field. A declared content type wins;
    /// otherwise password input types map to the password categories.
    pub fn resolve(content_type: ContentType, input_type: TextInputType) -> Self {
        match content_type {
            ContentType::Unspecified => match input_type {
                TextInputType::NewPassword => Self::NewPassword,
                TextInputType::VisiblePassword
                | TextInputType::NumberPassword
                | TextInputType::ScreenLockPassword => Self::Password,
                TextInputType::UserName => Self::UserName,
                _ => Self::Unspecified,
            },
            declared => declared.into(),
        }
    }

    /// Password categories.
    pub fn is_password(self) -> bool {
        matches!(self, Self::Password | Self::NewPassword)
    }
}

/// Completion callback for an auto-fill request. Receives the filled text,
/// or `None` when the user dismissed the service.
pub type AutoFillCallback = Box<dyn FnOnce(Option<String>) + Send + 'static>;

/// The system auto-fill service.
pub trait AutoFillService: Send + Sync {
    /// Asks the service for a value of `fill_type`. The service calls
    /// `on_complete` once, possibly later.
    fn request(&self, fill_type: AutoFillType, on_complete: AutoFillCallback);
}
