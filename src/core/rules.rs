//! Tiered rewrite rules for awaited storage calls.
//!
//! Each call on a line is rewritten by the first rule, in tier order, that
//! matches it. A call already carrying the tenant argument never matches, so
//! once every qualifying call is rewritten a second pass finds nothing.

use std::fmt;

use crate::core::call::Slot::{After, First, Last};
use crate::core::call::{Edit, Slot, StorageCall, apply_edits, find_calls};

/// How a rule selects method names
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch
{
    Exact(&'static str),
    /// Starts with the prefix and has at least one more character
    Prefix(&'static str),
    /// Like `Prefix`, excluding names starting with the second prefix
    PrefixExcept(&'static str, &'static str),
}

impl NameMatch
{
    pub fn matches(
        self,
        name: &str,
    ) -> bool
    {
        let longer =
            |prefix: &str| name.len() > prefix.len() && name.starts_with(prefix);

        match self
        {
            NameMatch::Exact(exact) => name == exact,
            NameMatch::Prefix(prefix) => longer(prefix),
            NameMatch::PrefixExcept(prefix, except) => longer(prefix) && !name.starts_with(except),
        }
    }
}

/// Number of pre-existing arguments a rule accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity
{
    /// Exactly n, on a call that closes on this line
    Exactly(usize),
    /// n or more, seen so far (open calls qualify)
    AtLeast(usize),
}

impl Arity
{
    fn accepts(
        self,
        call: &StorageCall<'_>,
    ) -> bool
    {
        match self
        {
            Arity::Exactly(n) => call.closed && call.arity() == n,
            Arity::AtLeast(n) => call.arity() >= n,
        }
    }
}

/// The tier a rule belongs to, in priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier
{
    Irregular,
    Update,
    Delete,
    GetById,
    GetAll,
}

impl fmt::Display for Tier
{
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result
    {
        match self
        {
            Tier::Irregular => write!(f, "irregular"),
            Tier::Update => write!(f, "update"),
            Tier::Delete => write!(f, "delete"),
            Tier::GetById => write!(f, "get-by-id"),
            Tier::GetAll => write!(f, "get-all"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rule
{
    pub name: NameMatch,
    pub arity: Arity,
    pub slot: Slot,
}

const fn exact(
    name: &'static str,
    arity: usize,
    slot: Slot,
) -> Rule
{
    Rule { name: NameMatch::Exact(name), arity: Arity::Exactly(arity), slot }
}

/// Per-method signatures that no family rule gets right.
///
/// Zero-argument entries use `Last`; any slot yields the sole argument.
pub const IRREGULAR: &[Rule] = &[
    Rule { name: NameMatch::Prefix("isUser"), arity: Arity::Exactly(2), slot: Last },
    exact("addMemberToWorkGroup", 2, Last),
    exact("removeMemberFromWorkGroup", 2, Last),
    exact("getUserEventRsvp", 2, Last),
    exact("getWorkGroupMembers", 1, Last),
    exact("getUserWorkGroups", 1, Last),
    exact("getTasksByWorkGroup", 1, Last),
    exact("getUserAccessRequests", 1, Last),
    exact("getTaskComments", 1, Last),
    exact("getAnnouncementFiles", 1, Last),
    exact("getUserFamilyRelationships", 1, Last),
    exact("getMessages", 1, Last),
    exact("getConversations", 1, Last),
    exact("getUnreadCount", 1, Last),
    exact("getUserMarketplaceItems", 1, Last),
    exact("getUserServices", 1, Last),
    exact("getPrayerTimeByDate", 1, Last),
    exact("getUserFinancialContributions", 1, Last),
    exact("getUserActivityLog", 1, Last),
    exact("getUserEventAttendance", 1, Last),
    exact("getUserBadges", 1, Last),
    exact("getUserProjects", 1, Last),
    exact("getUserPreferences", 1, Last),
    exact("getUserRequests", 1, Last),
    exact("getUserCertificates", 1, Last),
    exact("getUserByEmail", 1, Last),
    exact("getUserByUsername", 1, Last),
    exact("markAsRead", 2, Last),
    exact("markThreadAsRead", 2, Last),
    exact("getMessageThread", 2, Last),
    exact("answerImamQuestion", 2, After(1)),
    exact("markQuestionAsRead", 1, Last),
    exact("updateLastViewed", 2, After(1)),
    exact("getNewItemsCount", 2, After(1)),
    exact("getAllTasksWithWorkGroup", 2, First),
    exact("getAllWorkGroups", 2, First),
    exact("getFamilyMembersByRelationship", 2, Last),
    exact("setModerator", 3, After(2)),
    exact("moveTaskToWorkGroup", 2, Last),
    // Payload object usually opens on this line and closes further down
    Rule { name: NameMatch::Exact("updateEventRsvp"), arity: Arity::AtLeast(2), slot: After(1) },
    exact("deleteEventRsvp", 1, Last),
    exact("getWorkGroupModerators", 1, Last),
    exact("deleteTaskComment", 1, Last),
    exact("deleteFamilyRelationship", 1, Last),
    exact("deleteMessage", 1, Last),
    exact("deleteImamQuestion", 1, Last),
    exact("getOrganizationSettings", 0, Last),
    exact("updateOrganizationSettings", 1, First),
    exact("getPointsSettings", 0, Last),
    exact("updatePointsSettings", 1, First),
    exact("getUserCount", 0, Last),
    exact("getNewAnnouncementsCount", 1, First),
    exact("getUpcomingEventsCount", 0, Last),
    exact("getActiveTasksCount", 0, Last),
    exact("getPendingAccessRequestsCount", 0, Last),
    exact("getPendingAccessRequestsCount", 1, First),
    exact("getAllNewItemsCounts", 1, Last),
    exact("getRecentActivities", 0, Last),
    exact("getRecentActivities", 1, First),
    exact("getImamQuestions", 0, Last),
    exact("getImamQuestions", 1, First),
    exact("getUnansweredQuestionsCount", 0, Last),
    exact("getAllServicesWithUsers", 0, Last),
    exact("getAllProductPurchaseRequests", 0, Last),
    exact("updateProductPurchaseRequest", 2, After(1)),
    exact("getEventAttendance", 1, Last),
    exact("getUserTotalDonations", 1, Last),
    exact("deleteContributionWithLogs", 1, Last),
    exact("checkBadgeEligibility", 1, Last),
    exact("getProjectWithDetails", 1, Last),
    exact("getProjectContributions", 1, Last),
    exact("getProjectProposals", 1, Last),
    exact("updateAnnouncementFeed", 1, Last),
    exact("updateUserPoints", 2, After(1)),
    exact("updateRequestStatus", 3, After(1)),
    exact("deletePrayerTime", 1, Last),
    exact("deleteAllPrayerTimes", 0, Last),
    exact("getEventRsvps", 1, Last),
    exact("getEventLocations", 0, Last),
    // Badge and activity helpers
    exact("recalculateUserPoints", 1, Last),
    exact("checkAndAwardBadges", 1, Last),
    exact("removeUnqualifiedBadges", 1, Last),
    exact("getAllUserBadges", 0, Last),
    exact("getUserTasksCompleted", 1, Last),
    exact("getUserEventsAttended", 1, Last),
    exact("deleteActivityLogByRelatedEntity", 1, Last),
];

const UPDATE: &[Rule] =
    &[Rule { name: NameMatch::Prefix("update"), arity: Arity::AtLeast(2), slot: After(1) }];

const DELETE: &[Rule] =
    &[Rule { name: NameMatch::Prefix("delete"), arity: Arity::Exactly(1), slot: Last }];

const GET_BY_ID: &[Rule] = &[Rule {
    name: NameMatch::PrefixExcept("get", "getAll"),
    arity: Arity::Exactly(1),
    slot: Last,
}];

const GET_ALL: &[Rule] =
    &[Rule { name: NameMatch::Prefix("getAll"), arity: Arity::Exactly(0), slot: Last }];

/// All tiers in priority order
pub const TIERS: &[(Tier, &[Rule])] = &[
    (Tier::Irregular, IRREGULAR),
    (Tier::Update, UPDATE),
    (Tier::Delete, DELETE),
    (Tier::GetById, GET_BY_ID),
    (Tier::GetAll, GET_ALL),
];

/// Result of a successful rule application
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit
{
    pub line: String,
    pub tier: Tier,
    /// Number of calls the rule rewrote on the line
    pub calls: usize,
}

impl Rule
{
    fn edit_for(
        &self,
        call: &StorageCall<'_>,
        line: &str,
        tenant: &str,
    ) -> Option<Edit>
    {
        if !self
            .name
            .matches(call.method)
            || !self
                .arity
                .accepts(call)
            || call.carries(line, tenant)
        {
            return None;
        }
        call.edit(self.slot, tenant)
    }
}

/// Rewrite the storage calls on `line`, or `None` if no rule applies.
pub fn rewrite_line(
    line: &str,
    storage: &str,
    tenant: &str,
) -> Option<RuleHit>
{
    let calls = find_calls(line, storage);
    if calls.is_empty()
    {
        return None;
    }

    let mut edits = Vec::with_capacity(calls.len());
    let mut best: Option<Tier> = None;

    for call in &calls
    {
        if let Some((tier, edit)) = first_edit(call, line, tenant)
        {
            best = Some(best.map_or(tier, |b| b.min(tier)));
            edits.push(edit);
        }
    }

    let tier = best?;
    let count = edits.len();
    Some(RuleHit { line: apply_edits(line, edits), tier, calls: count })
}

/// Edit from the highest-priority rule matching `call`
fn first_edit(
    call: &StorageCall<'_>,
    line: &str,
    tenant: &str,
) -> Option<(Tier, Edit)>
{
    TIERS
        .iter()
        .flat_map(|&(tier, rules)| rules.iter().map(move |rule| (tier, rule)))
        .find_map(|(tier, rule)| {
            rule.edit_for(call, line, tenant)
                .map(|edit| (tier, edit))
        })
}
