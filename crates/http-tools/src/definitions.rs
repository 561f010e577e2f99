//! The Bitrise API tool set.
//!
//! Tool order here is the catalog order clients see in `tools/list`.

use crate::runtime::ApiBase;
use crate::tool::{Param, ParamType, ToolSpec};
use reqwest::Method;
use serde_json::json;

fn app_slug() -> Param {
    Param::path("app_slug", "Identifier of the Bitrise app")
}

fn build_slug() -> Param {
    Param::path("build_slug", "Identifier of the build")
}

fn workspace_slug() -> Param {
    Param::path("workspace_slug", "Slug of the Bitrise workspace")
}

fn next() -> Param {
    Param::query(
        "next",
        ParamType::String,
        "Slug of the first element in the response, used for paging",
    )
}

fn limit() -> Param {
    Param::query(
        "limit",
        ParamType::Integer,
        "Max number of elements per page (default: 50)",
    )
}

/// Every Bitrise tool, in catalog order.
#[must_use]
pub fn bitrise_tools() -> Vec<ToolSpec> {
    let mut tools = vec![user()];
    tools.extend(apps());
    tools.extend(builds());
    tools.extend(artifacts());
    tools.extend(workspaces());
    tools.extend(webhooks());
    tools.extend(cache_items());
    tools.extend(pipelines());
    tools.extend(group_roles());
    tools.extend(release_management());
    tools
}

fn user() -> ToolSpec {
    ToolSpec::new(
        "me",
        Method::GET,
        "/me",
        "Get user info for the currently authenticated user account",
    )
    .group("user")
}

fn apps() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            "list_apps",
            Method::GET,
            "/apps",
            "List all apps for the currently authenticated user account",
        )
        .group("apps")
        .param(
            Param::query("sort_by", ParamType::String, "Order of the apps")
                .one_of(["last_build_at", "created_at"])
                .default_value(json!("last_build_at")),
        )
        .param(next())
        .param(limit().default_value(json!(50))),
        ToolSpec::new(
            "register_app",
            Method::POST,
            "/apps/register",
            "Add a new app to Bitrise. The app must then be finished with finish_bitrise_app to \
             complete the registration. If the user has multiple workspaces, ask which one to use.",
        )
        .group("apps")
        .param(Param::body("repo_url", ParamType::String, "Repository URL").required())
        .param(
            Param::body(
                "is_public",
                ParamType::Boolean,
                "Whether the app's builds visibility is public",
            )
            .required(),
        )
        .param(
            Param::body(
                "organization_slug",
                ParamType::String,
                "The slug of the workspace that owns the app",
            )
            .required(),
        )
        .param(
            Param::body("project_type", ParamType::String, "Type of the project")
                .default_value(json!("other")),
        )
        .param(
            Param::body("provider", ParamType::String, "Repository provider")
                .default_value(json!("github")),
        ),
        ToolSpec::new(
            "finish_bitrise_app",
            Method::POST,
            "/apps/{app_slug}/finish",
            "Finish the setup of a Bitrise app. Once this succeeds, builds can be triggered via \
             trigger_bitrise_build.",
        )
        .group("apps")
        .param(app_slug())
        .param(
            Param::body("project_type", ParamType::String, "The type of your project")
                .default_value(json!("other")),
        )
        .param(
            Param::body("stack_id", ParamType::String, "The stack to run builds on")
                .default_value(json!("linux-docker-android-22.04")),
        )
        .param(
            Param::body("mode", ParamType::String, "The mode of setup")
                .default_value(json!("manual")),
        )
        .param(
            Param::body("config", ParamType::String, "The configuration preset to use")
                .default_value(json!("other-config")),
        ),
        ToolSpec::new(
            "get_app",
            Method::GET,
            "/apps/{app_slug}",
            "Get the details of a specific app.",
        )
        .group("apps")
        .param(app_slug()),
        ToolSpec::new(
            "delete_app",
            Method::DELETE,
            "/apps/{app_slug}",
            "Delete an app from Bitrise.",
        )
        .group("apps")
        .param(app_slug()),
        ToolSpec::new(
            "update_app",
            Method::PATCH,
            "/apps/{app_slug}",
            "Update an app. Only app_slug is required; omit the fields you don't wish to update.",
        )
        .group("apps")
        .param(app_slug())
        .param(Param::body(
            "is_public",
            ParamType::Boolean,
            "Whether the app's builds visibility is public",
        ))
        .param(Param::body("project_type", ParamType::String, "Type of the project"))
        .param(Param::body("provider", ParamType::String, "Repository provider"))
        .param(Param::body("repo_url", ParamType::String, "Repository URL")),
        ToolSpec::new(
            "get_bitrise_yml",
            Method::GET,
            "/apps/{app_slug}/bitrise.yml",
            "Get the current Bitrise YML config file of a specified Bitrise app.",
        )
        .group("apps")
        .param(app_slug()),
        ToolSpec::new(
            "update_bitrise_yml",
            Method::POST,
            "/apps/{app_slug}/bitrise.yml",
            "Update the Bitrise YML config file of a specified Bitrise app.",
        )
        .group("apps")
        .param(app_slug())
        .param(
            Param::body(
                "bitrise_yml_as_json",
                ParamType::String,
                "The new Bitrise YML config file content, as JSON",
            )
            .required()
            .sent_as("app_config_datastore_yaml"),
        ),
        ToolSpec::new(
            "list_branches",
            Method::GET,
            "/apps/{app_slug}/branches",
            "List the branches with existing builds of an app's repository.",
        )
        .group("apps")
        .param(app_slug()),
        ToolSpec::new(
            "register_ssh_key",
            Method::POST,
            "/apps/{app_slug}/register-ssh-key",
            "Add an SSH-key to a specific app.",
        )
        .group("apps")
        .param(app_slug())
        .param(
            Param::body("auth_ssh_private_key", ParamType::String, "Private SSH key")
                .required(),
        )
        .param(Param::body("auth_ssh_public_key", ParamType::String, "Public SSH key").required())
        .param(Param::body(
            "is_register_key_into_provider_service",
            ParamType::Boolean,
            "Register the key in the provider service",
        )),
        ToolSpec::new(
            "register_webhook",
            Method::POST,
            "/apps/{app_slug}/register-webhook",
            "Register an incoming webhook for a specific application.",
        )
        .group("apps")
        .param(app_slug()),
    ]
}

fn builds() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            "list_builds",
            Method::GET,
            "/apps/{app_slug}/builds",
            "List all the builds of a specified Bitrise app or all accessible builds.",
        )
        .group("builds")
        .fallback_path("/builds")
        .param(app_slug().optional())
        .param(
            Param::query("sort_by", ParamType::String, "Order of builds")
                .one_of(["created_at", "running_first"])
                .default_value(json!("created_at")),
        )
        .param(Param::query("branch", ParamType::String, "Filter builds by branch"))
        .param(Param::query("workflow", ParamType::String, "Filter builds by workflow"))
        .param(
            Param::query(
                "status",
                ParamType::Integer,
                "Filter builds by status (0: not finished, 1: successful, 2: failed, \
                 3: aborted, 4: in-progress)",
            )
            .one_of([0, 1, 2, 3, 4]),
        )
        .param(next())
        .param(limit()),
        ToolSpec::new(
            "trigger_bitrise_build",
            Method::POST,
            "/apps/{app_slug}/builds",
            "Trigger a new build/pipeline for a specified Bitrise app",
        )
        .group("builds")
        .fixed_body(json!({ "hook_info": { "type": "bitrise" } }))
        .param(app_slug())
        .param(
            Param::body("branch", ParamType::String, "The branch to build")
                .default_value(json!("main"))
                .sent_as("build_params.branch"),
        )
        .param(
            Param::body("workflow_id", ParamType::String, "The workflow to build")
                .sent_as("build_params.workflow_id"),
        )
        .param(
            Param::body("pipeline_id", ParamType::String, "The pipeline to build")
                .sent_as("build_params.pipeline_id"),
        )
        .param(
            Param::body("commit_message", ParamType::String, "The commit message for the build")
                .sent_as("build_params.commit_message"),
        )
        .param(
            Param::body("commit_hash", ParamType::String, "The commit hash for the build")
                .sent_as("build_params.commit_hash"),
        ),
        ToolSpec::new(
            "get_build",
            Method::GET,
            "/apps/{app_slug}/builds/{build_slug}",
            "Get a specific build of a given app.",
        )
        .group("builds")
        .param(app_slug())
        .param(build_slug()),
        ToolSpec::new(
            "abort_build",
            Method::POST,
            "/apps/{app_slug}/builds/{build_slug}/abort",
            "Abort a specific build.",
        )
        .group("builds")
        .param(app_slug())
        .param(build_slug())
        .param(
            Param::body("reason", ParamType::String, "Reason for aborting the build")
                .sent_as("abort_reason"),
        ),
        ToolSpec::new(
            "get_build_log",
            Method::GET,
            "/apps/{app_slug}/builds/{build_slug}/log",
            "Get the build log of a specified build of a Bitrise app.",
        )
        .group("builds")
        .param(app_slug())
        .param(build_slug()),
        ToolSpec::new(
            "get_build_bitrise_yml",
            Method::GET,
            "/apps/{app_slug}/builds/{build_slug}/bitrise.yml",
            "Get the bitrise.yml of a build.",
        )
        .group("builds")
        .param(app_slug())
        .param(build_slug()),
        ToolSpec::new(
            "list_build_workflows",
            Method::GET,
            "/apps/{app_slug}/build-workflows",
            "List the workflows of an app.",
        )
        .group("builds")
        .param(app_slug()),
    ]
}

fn artifacts() -> Vec<ToolSpec> {
    let artifact_slug = || Param::path("artifact_slug", "Identifier of the artifact");
    vec![
        ToolSpec::new(
            "list_artifacts",
            Method::GET,
            "/apps/{app_slug}/builds/{build_slug}/artifacts",
            "Get a list of all build artifacts.",
        )
        .group("artifacts")
        .param(app_slug())
        .param(build_slug())
        .param(next())
        .param(limit()),
        ToolSpec::new(
            "get_artifact",
            Method::GET,
            "/apps/{app_slug}/builds/{build_slug}/artifacts/{artifact_slug}",
            "Get a specific build artifact.",
        )
        .group("artifacts")
        .param(app_slug())
        .param(build_slug())
        .param(artifact_slug()),
        ToolSpec::new(
            "delete_artifact",
            Method::DELETE,
            "/apps/{app_slug}/builds/{build_slug}/artifacts/{artifact_slug}",
            "Delete a build artifact.",
        )
        .group("artifacts")
        .param(app_slug())
        .param(build_slug())
        .param(artifact_slug()),
        ToolSpec::new(
            "update_artifact",
            Method::PATCH,
            "/apps/{app_slug}/builds/{build_slug}/artifacts/{artifact_slug}",
            "Update a build artifact.",
        )
        .group("artifacts")
        .param(app_slug())
        .param(build_slug())
        .param(artifact_slug())
        .param(
            Param::body(
                "is_public_page_enabled",
                ParamType::Boolean,
                "Enable public page for the artifact",
            )
            .required(),
        ),
    ]
}

fn workspaces() -> Vec<ToolSpec> {
    vec![
        ToolSpec::new(
            "list_workspaces",
            Method::GET,
            "/organizations",
            "List the workspaces the user has access to",
        )
        .group("workspaces"),
        ToolSpec::new(
            "get_workspace",
            Method::GET,
            "/organizations/{workspace_slug}",
            "Get details for one workspace",
        )
        .group("workspaces")
        .param(workspace_slug()),
        ToolSpec::new(
            "get_workspace_groups",
            Method::GET,
            "/organizations/{workspace_slug}/groups",
            "Get the groups in a workspace",
        )
        .group("workspaces")
        .param(workspace_slug()),
        ToolSpec::new(
            "create_workspace_group",
            Method::POST,
            "/organizations/{workspace_slug}/groups",
            "Create a new group in a workspace.",
        )
        .group("workspaces")
        .param(workspace_slug())
        .param(
            Param::body("group_name", ParamType::String, "Name of the group")
                .required()
                .sent_as("name"),
        ),
        ToolSpec::new(
            "get_workspace_members",
            Method::GET,
            "/organizations/{workspace_slug}/members",
            "Get the members of a workspace",
        )
        .group("workspaces")
        .param(workspace_slug()),
        ToolSpec::new(
            "invite_member_to_workspace",
            Method::POST,
            "/organizations/{workspace_slug}/members",
            "Invite new Bitrise users to a workspace.",
        )
        .group("workspaces")
        .param(workspace_slug())
        .param(Param::body("email", ParamType::String, "Email address of the user").required()),
        ToolSpec::new(
            "add_member_to_group",
            Method::PUT,
            "/groups/{group_slug}/members/{user_slug}",
            "Add a member to a group.",
        )
        .group("workspaces")
        .param(Param::path("group_slug", "Slug of the group"))
        .param(Param::path("user_slug", "Slug of the user")),
    ]
}

fn webhooks() -> Vec<ToolSpec> {
    let webhook_slug = || Param::path("webhook_slug", "Identifier of the webhook");
    let events = || {
        Param::body(
            "events",
            ParamType::Array,
            "List of events to trigger the webhook",
        )
    };
    let url = || Param::body("url", ParamType::String, "URL of the webhook");
    let headers = || {
        Param::body(
            "headers",
            ParamType::Object,
            "Headers to be sent with the webhook",
        )
    };
    vec![
        ToolSpec::new(
            "list_outgoing_webhooks",
            Method::GET,
            "/apps/{app_slug}/outgoing-webhooks",
            "List the outgoing webhooks of an app.",
        )
        .group("webhooks")
        .param(app_slug()),
        ToolSpec::new(
            "delete_outgoing_webhook",
            Method::DELETE,
            "/apps/{app_slug}/outgoing-webhooks/{webhook_slug}",
            "Delete the outgoing webhook of an app.",
        )
        .group("webhooks")
        .param(app_slug())
        .param(webhook_slug()),
        ToolSpec::new(
            "create_outgoing_webhook",
            Method::POST,
            "/apps/{app_slug}/outgoing-webhooks",
            "Create an outgoing webhook for an app.",
        )
        .group("webhooks")
        .param(app_slug())
        .param(events().required())
        .param(url().required())
        .param(headers()),
        ToolSpec::new(
            "update_outgoing_webhook",
            Method::PATCH,
            "/apps/{app_slug}/outgoing-webhooks/{webhook_slug}",
            "Update an outgoing webhook for an app. Every parameter must be provided; pass the \
             existing value for the ones you do not want to change.",
        )
        .group("webhooks")
        .param(app_slug())
        .param(webhook_slug())
        .param(events())
        .param(url())
        .param(headers()),
    ]
}

fn cache_items() -> Vec<ToolSpec> {
    let cache_item_id = || Param::path("cache_item_id", "Identifier of the cache item");
    vec![
        ToolSpec::new(
            "list_cache_items",
            Method::GET,
            "/apps/{app_slug}/cache-items",
            "List the key-value cache items belonging to an app.",
        )
        .group("cache-items")
        .param(app_slug()),
        ToolSpec::new(
            "delete_all_cache_items",
            Method::DELETE,
            "/apps/{app_slug}/cache",
            "Delete all key-value cache items belonging to an app.",
        )
        .group("cache-items")
        .param(app_slug()),
        ToolSpec::new(
            "delete_cache_item",
            Method::DELETE,
            "/apps/{app_slug}/cache/{cache_item_id}",
            "Delete a key-value cache item.",
        )
        .group("cache-items")
        .param(app_slug())
        .param(cache_item_id()),
        ToolSpec::new(
            "get_cache_item_download_url",
            Method::GET,
            "/apps/{app_slug}/cache-items/{cache_item_id}/download",
            "Get the download URL for a cache item.",
        )
        .group("cache-items")
        .param(app_slug())
        .param(cache_item_id()),
    ]
}

fn pipelines() -> Vec<ToolSpec> {
    let pipeline_id = || Param::path("pipeline_id", "Identifier of the pipeline");
    vec![
        ToolSpec::new(
            "list_pipelines",
            Method::GET,
            "/apps/{app_slug}/pipelines",
            "List all pipelines and standalone builds of an app.",
        )
        .group("pipelines")
        .param(app_slug()),
        ToolSpec::new(
            "get_pipeline",
            Method::GET,
            "/apps/{app_slug}/pipelines/{pipeline_id}",
            "Get a pipeline of a given app.",
        )
        .group("pipelines")
        .param(app_slug())
        .param(pipeline_id()),
        ToolSpec::new(
            "abort_pipeline",
            Method::POST,
            "/apps/{app_slug}/pipelines/{pipeline_id}/abort",
            "Abort a pipeline.",
        )
        .group("pipelines")
        .param(app_slug())
        .param(pipeline_id())
        .param(
            Param::body("reason", ParamType::String, "Reason for aborting the pipeline")
                .sent_as("abort_reason"),
        ),
        ToolSpec::new(
            "rebuild_pipeline",
            Method::POST,
            "/apps/{app_slug}/pipelines/{pipeline_id}/rebuild",
            "Rebuild a pipeline.",
        )
        .group("pipelines")
        .fixed_body(json!({}))
        .param(app_slug())
        .param(pipeline_id()),
    ]
}

fn group_roles() -> Vec<ToolSpec> {
    let role_name = || Param::path("role_name", "Name of the role");
    vec![
        ToolSpec::new(
            "list_group_roles",
            Method::GET,
            "/apps/{app_slug}/roles/{role_name}",
            "List group roles for an app",
        )
        .group("group-roles")
        .param(app_slug())
        .param(role_name()),
        ToolSpec::new(
            "replace_group_roles",
            Method::PUT,
            "/apps/{app_slug}/roles/{role_name}",
            "Replace group roles for an app.",
        )
        .group("group-roles")
        .param(app_slug())
        .param(role_name())
        .param(
            Param::body("group_slugs", ParamType::Array, "List of group slugs").required(),
        ),
    ]
}

const RELEASE_MANAGEMENT: &str = "release-management";

fn connected_app_id(description: &str) -> Param {
    Param::path("connected_app_id", description)
}

fn items_per_page(what: &str) -> Param {
    Param::query(
        "items_per_page",
        ParamType::Integer,
        &format!("Maximum number of {what} returned per page. Default value is 10."),
    )
    .default_value(json!(10))
}

fn page() -> Param {
    Param::query(
        "page",
        ParamType::Integer,
        "Which page of the whole result set to return. Default value is 1.",
    )
    .default_value(json!(1))
}

fn platform_filter(what: &str) -> Param {
    Param::query(
        "platform",
        ParamType::String,
        &format!("Filter {what} by mobile platform: 'ios' or 'android'."),
    )
    .one_of(["ios", "android"])
}

fn rm(name: &str, method: Method, path: &str, description: &str) -> ToolSpec {
    ToolSpec::new(name, method, path, description)
        .on(ApiBase::ReleaseManagement)
        .group(RELEASE_MANAGEMENT)
}

fn release_management() -> Vec<ToolSpec> {
    let app_of_artifact =
        "Identifier of the Release Management connected app for the installable artifact";
    let app_of_tester_group = "The uuidV4 identifier of the app the tester group is connected to";
    let artifact_id = || {
        Param::path(
            "installable_artifact_id",
            "The uuidV4 identifier of the installable artifact",
        )
    };
    let tester_group_id = |description: &str| Param::path("id", description);
    vec![
        rm(
            "create_connected_app",
            Method::POST,
            "/v1/connected-apps",
            "Add a new Release Management connected app to Bitrise.",
        )
        .param(
            Param::body(
                "platform",
                ParamType::String,
                "Mobile platform of the connected app: 'ios' or 'android'.",
            )
            .required()
            .one_of(["ios", "android"]),
        )
        .param(
            Param::body(
                "store_app_id",
                ParamType::String,
                "App store identifier: the bundle id for iOS, the package name for Android.",
            )
            .required(),
        )
        .param(
            Param::body(
                "workspace_slug",
                ParamType::String,
                "Identifier of the Bitrise workspace the connected app belongs to.",
            )
            .required(),
        )
        .param(Param::body(
            "id",
            ParamType::String,
            "A uuidV4 identifier for the new connected app; generated when omitted.",
        ))
        .param(Param::body(
            "manual_connection",
            ParamType::Boolean,
            "Connect manually, bypassing store API keys; requires 'store_app_name'. Default false.",
        ))
        .param(Param::body(
            "project_id",
            ParamType::String,
            "Bitrise project to associate the connected app with; a new project is created when omitted.",
        ))
        .param(Param::body(
            "store_app_name",
            ParamType::String,
            "App name for a manual connection without store API keys.",
        ))
        .param(Param::body(
            "store_credential_id",
            ParamType::String,
            "Store credential to use: an Apple API credential for iOS, a Google Service credential for Android.",
        )),
        rm(
            "list_connected_apps",
            Method::GET,
            "/v1/connected-apps",
            "List Release Management connected apps available for the authenticated account within a workspace.",
        )
        .param(
            Param::query(
                "workspace_slug",
                ParamType::String,
                "Identifier of the Bitrise workspace for the connected apps.",
            )
            .required(),
        )
        .param(Param::query(
            "project_id",
            ParamType::String,
            "Only connected apps of this Bitrise project.",
        ))
        .param(platform_filter("connected apps"))
        .param(Param::query(
            "search",
            ParamType::String,
            "Case-sensitive search by bundle ID, package name or app title.",
        ))
        .param(items_per_page("connected apps"))
        .param(page()),
        rm(
            "get_connected_app",
            Method::GET,
            "/v1/connected-apps/{id}",
            "Gives back a Release Management connected app for the authenticated account.",
        )
        .param(Param::path("id", "Identifier of the Release Management connected app")),
        rm(
            "update_connected_app",
            Method::PATCH,
            "/v1/connected-apps/{connected_app_id}",
            "Updates a connected app.",
        )
        .param(connected_app_id("The uuidV4 identifier of the connected app"))
        .param(Param::body(
            "connect_to_store",
            ParamType::Boolean,
            "Validate the connected app against the App Store or Google Play using the store app id and credential. Default false.",
        ))
        .param(Param::body(
            "store_app_id",
            ParamType::String,
            "New store identifier: the bundle id for iOS, the package name for Android.",
        ))
        .param(Param::body(
            "store_credential_id",
            ParamType::String,
            "Store credential to use: an Apple API credential for iOS, a Google Service credential for Android.",
        )),
        rm(
            "list_installable_artifacts",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/installable-artifacts",
            "List Release Management installable artifacts of a connected app available for the authenticated account.",
        )
        .param(connected_app_id(app_of_artifact))
        .param(Param::query(
            "after_date",
            ParamType::String,
            "ISO 8601 start of the creation/upload interval. Defaults to one month ago unless distribution_ready is set.",
        ))
        .param(
            Param::query(
                "artifact_type",
                ParamType::String,
                "Artifact type: 'aab' or 'apk' for Android, 'ipa' for iOS.",
            )
            .one_of(["aab", "apk", "ipa"]),
        )
        .param(Param::query(
            "before_date",
            ParamType::String,
            "ISO 8601 end of the creation/upload interval. Defaults to now unless distribution_ready is set.",
        ))
        .param(Param::query(
            "branch",
            ParamType::String,
            "Bitrise CI branch the artifact was built on.",
        ))
        .param(Param::query(
            "distribution_ready",
            ParamType::Boolean,
            "Only distribution ready artifacts (.apk, and .ipa with ad-hoc, development or enterprise distribution).",
        ))
        .param(items_per_page("installable artifacts"))
        .param(page())
        .param(platform_filter("installable artifacts"))
        .param(Param::query(
            "search",
            ParamType::String,
            "Case-sensitive search by version, file name or build number.",
        ))
        .param(
            Param::query("source", ParamType::String, "Artifact source: 'api' or 'ci'.")
                .one_of(["api", "ci"]),
        )
        .param(Param::query(
            "store_signed",
            ParamType::Boolean,
            "Only store ready artifacts (signed .aab, and .ipa with app-store distribution).",
        ))
        .param(Param::query(
            "version",
            ParamType::String,
            "App version the artifact was built for. Required when distribution_ready is true.",
        ))
        .param(Param::query(
            "workflow",
            ParamType::String,
            "Bitrise CI workflow that generated the artifact.",
        )),
        rm(
            "generate_installable_artifact_upload_url",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/installable-artifacts/{installable_artifact_id}/upload-url",
            "Generates a signed upload URL, valid for 1 hour, for an installable artifact. The response \
             holds the URL, HTTP method and headers to upload the file with. The artifact is processed \
             after upload; check get_installable_artifact_upload_and_processing_status for progress.",
        )
        .param(connected_app_id(app_of_artifact))
        .param(Param::path(
            "installable_artifact_id",
            "A uuidV4 identifier generated on the client side for the installable artifact",
        ))
        .param(
            Param::query(
                "file_name",
                ParamType::String,
                "File name (with extension) of the artifact to upload.",
            )
            .required(),
        )
        .param(
            Param::query(
                "file_size_bytes",
                ParamType::String,
                "Byte size of the artifact file to upload.",
            )
            .required(),
        )
        .param(Param::query(
            "branch",
            ParamType::String,
            "CI branch the artifact was built on.",
        ))
        .param(Param::query(
            "with_public_page",
            ParamType::Boolean,
            "Enable the public install page. Needs project admin, project owner or workspace admin rights. Default false.",
        ))
        .param(Param::query(
            "workflow",
            ParamType::String,
            "CI workflow that generated the artifact.",
        )),
        rm(
            "get_installable_artifact_upload_and_processing_status",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/installable-artifacts/{installable_artifact_id}/status",
            "Gets the upload and processing status of an installable artifact. An uploaded artifact is \
             usable once processing has finished.",
        )
        .param(connected_app_id(app_of_artifact))
        .param(artifact_id()),
        rm(
            "set_installable_artifact_public_install_page",
            Method::PATCH,
            "/v1/connected-apps/{connected_app_id}/installable-artifacts/{installable_artifact_id}/public-install-page",
            "Changes whether public install page should be available for the installable artifact or not.",
        )
        .param(connected_app_id(app_of_artifact))
        .param(artifact_id())
        .param(
            Param::body(
                "with_public_page",
                ParamType::Boolean,
                "Enable or disable the public install page.",
            )
            .required(),
        ),
        rm(
            "list_build_distribution_versions",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/build-distributions",
            "Lists Build Distribution versions: the app versions available for testers. Build \
             distribution sends installable artifacts to tester groups for over-the-air installation \
             without TestFlight or Google Play.",
        )
        .param(connected_app_id(
            "The uuidV4 identifier of the app the build distribution is connected to",
        ))
        .param(items_per_page("build distribution versions"))
        .param(page()),
        rm(
            "list_build_distribution_version_test_builds",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/build-distributions/test-builds",
            "Gives back a list of test builds for the given build distribution version.",
        )
        .param(connected_app_id(
            "The uuidV4 identifier of the app the build distribution is connected to",
        ))
        .param(
            Param::query(
                "version",
                ParamType::String,
                "Version of the build distribution.",
            )
            .required(),
        )
        .param(items_per_page("test builds"))
        .param(page()),
        rm(
            "create_tester_group",
            Method::POST,
            "/v1/connected-apps/{connected_app_id}/tester-groups",
            "Creates a tester group for a Release Management connected app. Tester groups get notified, \
             automatically or manually, by email when a new installable artifact is available. Only the \
             workspace owner, a workspace manager or the project admin can manage tester groups.",
        )
        .param(connected_app_id("The uuidV4 identifier of the related connected app"))
        .param(Param::body(
            "name",
            ParamType::String,
            "Name of the tester group, unique within the connected app.",
        ))
        .param(Param::body(
            "auto_notify",
            ParamType::Boolean,
            "Notify the group automatically about new builds. Default false.",
        )),
        rm(
            "notify_tester_group",
            Method::POST,
            "/v1/connected-apps/{connected_app_id}/tester-groups/{id}/notify",
            "Notifies a tester group about a new test build.",
        )
        .param(connected_app_id("The uuidV4 identifier of the related connected app"))
        .param(tester_group_id("The uuidV4 identifier of the tester group to notify"))
        .param(
            Param::body(
                "test_build_id",
                ParamType::String,
                "Identifier of the test build sent in the notification.",
            )
            .required(),
        ),
        rm(
            "add_testers_to_tester_group",
            Method::POST,
            "/v1/connected-apps/{connected_app_id}/tester-groups/{id}/add-testers",
            "Adds testers to a tester group of a connected app.",
        )
        .param(connected_app_id("The uuidV4 identifier of the related connected app"))
        .param(tester_group_id("The uuidV4 identifier of the tester group"))
        .param(
            Param::body(
                "user_slugs",
                ParamType::Array,
                "Slugs of the users to add to the tester group.",
            )
            .required(),
        ),
        rm(
            "update_tester_group",
            Method::PUT,
            "/v1/connected-apps/{connected_app_id}/tester-groups/{id}",
            "Updates the name and the auto notification setting of a tester group.",
        )
        .param(connected_app_id("The uuidV4 identifier of the related connected app"))
        .param(tester_group_id("The uuidV4 identifier of the tester group"))
        .param(Param::body(
            "name",
            ParamType::String,
            "New name, unique within the connected app.",
        ))
        .param(Param::body(
            "auto_notify",
            ParamType::Boolean,
            "Notify the group automatically about new builds from now on. Default false.",
        )),
        rm(
            "list_tester_groups",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/tester-groups",
            "Gives back a list of tester groups related to a specific Release Management connected app.",
        )
        .param(connected_app_id(app_of_tester_group))
        .param(items_per_page("tester groups"))
        .param(page()),
        rm(
            "get_tester_group",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/tester-groups/{id}",
            "Gives back the details of the selected tester group.",
        )
        .param(connected_app_id(app_of_tester_group))
        .param(tester_group_id("The uuidV4 identifier of the tester group")),
        rm(
            "get_potential_testers",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/tester-groups/{id}/potential-testers",
            "Gets the Bitrise users with access to the connected app who can be added to a tester group.",
        )
        .param(connected_app_id(app_of_tester_group))
        .param(tester_group_id("The uuidV4 identifier of the tester group"))
        .param(items_per_page("potential testers"))
        .param(page())
        .param(Param::query(
            "search",
            ParamType::String,
            "Case-insensitive search by email or username.",
        )),
        rm(
            "get_testers",
            Method::GET,
            "/v1/connected-apps/{connected_app_id}/testers",
            "Gives back the testers added to tester groups of a connected app.",
        )
        .param(connected_app_id(app_of_tester_group))
        .param(Param::query(
            "tester_group_id",
            ParamType::String,
            "Only testers of this tester group.",
        ))
        .param(items_per_page("testers"))
        .param(page()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn every_definition_is_well_formed_and_uniquely_named() {
        let tools = bitrise_tools();
        let mut names = HashSet::new();
        for tool in &tools {
            tool.validate().expect("definition validates");
            assert!(names.insert(tool.name()), "duplicate tool {}", tool.name());
            assert!(!tool.groups().is_empty(), "{} has no group", tool.name());
        }
        assert_eq!(tools.first().map(ToolSpec::name), Some("me"));
        assert_eq!(tools.len(), 62);
    }

    #[test]
    fn release_management_tools_use_their_own_api() {
        let tools: Vec<ToolSpec> = bitrise_tools()
            .into_iter()
            .filter(|t| t.groups().contains(&RELEASE_MANAGEMENT))
            .collect();
        assert_eq!(tools.len(), 18);

        let req = tools
            .iter()
            .find(|t| t.name() == "list_connected_apps")
            .expect("tool exists")
            .build_request(&json!({ "workspace_slug": "ws", "platform": "ios" }))
            .expect("valid");
        assert_eq!(req.base, ApiBase::ReleaseManagement);
        assert_eq!(req.path, "/v1/connected-apps");
        assert_eq!(
            req.query,
            vec![
                ("workspace_slug".to_string(), "ws".to_string()),
                ("platform".to_string(), "ios".to_string()),
                ("items_per_page".to_string(), "10".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );

        let req = tools
            .iter()
            .find(|t| t.name() == "add_testers_to_tester_group")
            .expect("tool exists")
            .build_request(&json!({
                "connected_app_id": "c1",
                "id": "g1",
                "user_slugs": ["u1", "u2"],
            }))
            .expect("valid");
        assert_eq!(req.base, ApiBase::ReleaseManagement);
        assert_eq!(req.path, "/v1/connected-apps/c1/tester-groups/g1/add-testers");
        assert_eq!(req.body, Some(json!({ "user_slugs": ["u1", "u2"] })));
    }

    #[test]
    fn read_only_group_matches_get_methods() {
        for tool in bitrise_tools() {
            assert_eq!(
                tool.groups().contains(&crate::tool::READ_ONLY_GROUP),
                tool.annotations().read_only_hint == Some(true),
                "{}",
                tool.name()
            );
        }
    }

    #[test]
    fn renamed_body_fields_reach_the_wire_name() {
        let tools = bitrise_tools();
        let find = |name: &str| {
            tools
                .iter()
                .find(|t| t.name() == name)
                .cloned()
                .expect("tool exists")
        };

        let req = find("update_bitrise_yml")
            .build_request(&json!({ "app_slug": "a", "bitrise_yml_as_json": "{}" }))
            .expect("valid");
        assert_eq!(req.body, Some(json!({ "app_config_datastore_yaml": "{}" })));

        let req = find("create_workspace_group")
            .build_request(&json!({ "workspace_slug": "w", "group_name": "qa" }))
            .expect("valid");
        assert_eq!(req.path, "/organizations/w/groups");
        assert_eq!(req.body, Some(json!({ "name": "qa" })));

        let req = find("rebuild_pipeline")
            .build_request(&json!({ "app_slug": "a", "pipeline_id": "p" }))
            .expect("valid");
        assert_eq!(req.body, Some(json!({})));
    }
}
